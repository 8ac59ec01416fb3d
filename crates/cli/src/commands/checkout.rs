//! Order placement.

use chrono::Utc;
use clap::Args;
use vitrina_admin::events::AdminEvent;
use vitrina_core::{
    DeliveryMethod, DeliveryVehicle, DeliveryZone, PaymentMethod, ShippingAddress, format_price,
};
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::notifications::DEFAULT_TOAST_TTL;

use super::{CommandResult, emit, flush_toasts, open_state};

/// The checkout form, as command-line flags.
#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,

    /// `pickup`, `delivery` or `shipping`
    #[arg(long)]
    delivery: DeliveryMethod,
    #[arg(long)]
    pickup_point: Option<String>,
    /// `moto` or `carro`
    #[arg(long)]
    vehicle: Option<DeliveryVehicle>,
    #[arg(long)]
    zone: Option<DeliveryZone>,

    #[arg(long)]
    recipient: Option<String>,
    #[arg(long)]
    id_number: Option<String>,
    #[arg(long)]
    shipping_phone: Option<String>,
    #[arg(long = "state")]
    region: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    agency: Option<String>,

    /// `cash`, `pago_movil`, `binance`, `zelle` or `transfer`
    #[arg(long)]
    payment: PaymentMethod,
    #[arg(long)]
    reference: Option<String>,
    #[arg(long)]
    coupon: Option<String>,
}

/// Fill the form, place the order and print the receipt.
///
/// # Errors
///
/// Returns an error if the cart is empty, a required field is missing, the
/// payment method is not offered for the delivery option, or the coupon is
/// not redeemable. Nothing is recorded then.
pub async fn run(config: StorefrontConfig, args: CheckoutArgs) -> CommandResult {
    let mut state = open_state(config)?;
    let now = Utc::now();

    let form = state.checkout_mut();
    form.set_customer_name(args.name);
    form.set_customer_email(args.email);
    form.set_customer_phone(args.phone);
    form.set_delivery_method(Some(args.delivery));
    form.set_delivery_vehicle(args.vehicle);
    form.set_delivery_zone(args.zone);
    form.set_pickup_point(args.pickup_point);
    if args.delivery == DeliveryMethod::Shipping {
        form.set_shipping_address(ShippingAddress {
            recipient: args.recipient.unwrap_or_default(),
            id_number: args.id_number.unwrap_or_default(),
            phone: args.shipping_phone.unwrap_or_default(),
            state: args.region.unwrap_or_default(),
            city: args.city.unwrap_or_default(),
            address_line: args.address.unwrap_or_default(),
            agency: args.agency.unwrap_or_default(),
        });
    }
    form.set_payment_method(Some(args.payment))?;
    form.set_payment_reference(args.reference);

    if let Some(code) = args.coupon.as_deref() {
        state.apply_coupon(code, now)?;
    }

    let summary = state.checkout().summary(state.cart(), state.catalog());
    let placed = state.place_order(now)?;
    state.announce_order(&placed.order).await;

    emit(format_args!("Order {} placed", placed.order.id));
    emit(format_args!("  Subtotal  {:>10}", format_price(summary.subtotal)));
    emit(format_args!("  Shipping  {:>10}", format_price(summary.shipping)));
    if !summary.discount.is_zero() {
        emit(format_args!("  Discount -{:>9}", format_price(summary.discount)));
    }
    emit(format_args!("  Total     {:>10}", format_price(placed.order.total())));
    flush_toasts(&mut state);

    for event in AdminEvent::from_placed_order(&placed) {
        emit(event.toast(now + DEFAULT_TOAST_TTL));
    }
    Ok(())
}
