//! Delivery fees.

use rust_decimal::Decimal;
use vitrina_core::{DeliveryMethod, DeliveryVehicle, DeliveryZone};

const fn dollars(cents: u32) -> Decimal {
    Decimal::from_parts(cents, 0, 0, false, 2)
}

/// Flat fee for national shipping.
pub const SHIPPING_FEE: Decimal = dollars(500);

/// Local courier fee per zone: `(zone, moto, carro)`.
pub const DELIVERY_FEES: [(DeliveryZone, Decimal, Decimal); 5] = [
    (DeliveryZone::ValenciaNorte, dollars(200), dollars(400)),
    (DeliveryZone::ValenciaSur, dollars(300), dollars(500)),
    (DeliveryZone::Naguanagua, dollars(300), dollars(500)),
    (DeliveryZone::SanDiego, dollars(400), dollars(600)),
    (DeliveryZone::Guacara, dollars(500), dollars(800)),
];

/// Courier fee for a vehicle and zone.
#[must_use]
pub fn delivery_fee(vehicle: DeliveryVehicle, zone: DeliveryZone) -> Decimal {
    DELIVERY_FEES
        .iter()
        .find(|(z, _, _)| *z == zone)
        .map_or(Decimal::ZERO, |(_, moto, carro)| match vehicle {
            DeliveryVehicle::Moto => *moto,
            DeliveryVehicle::Carro => *carro,
        })
}

/// Shipping cost for the selected options. Zero while a needed option is
/// unset.
#[must_use]
pub fn shipping_cost(
    method: Option<DeliveryMethod>,
    vehicle: Option<DeliveryVehicle>,
    zone: Option<DeliveryZone>,
) -> Decimal {
    match (method, vehicle, zone) {
        (Some(DeliveryMethod::Shipping), _, _) => SHIPPING_FEE,
        (Some(DeliveryMethod::Delivery), Some(vehicle), Some(zone)) => delivery_fee(vehicle, zone),
        _ => Decimal::ZERO,
    }
}
