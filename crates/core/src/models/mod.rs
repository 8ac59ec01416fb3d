//! Domain models shared by the storefront and the back-office.

pub mod banner;
pub mod category;
pub mod content;
pub mod coupon;
pub mod order;
pub mod product;
pub mod session;
pub mod settings;

pub use banner::{Banner, BannerUpdate, QuickCategory, QuickCategoryUpdate};
pub use category::{Category, CategoryUpdate};
pub use content::{Bundle, ProductStage, SiteContent};
pub use coupon::{Coupon, CouponKind, CouponUpdate, is_valid_coupon_code};
pub use order::{
    DeliveryMethod, DeliveryVehicle, DeliveryZone, Order, OrderItem, PaymentMethod,
    ShippingAddress,
};
pub use product::{Product, ProductAttribute, ProductSpec, ProductUpdate, SpecValue};
pub use session::{AdminSession, UserSession};
pub use settings::Settings;
