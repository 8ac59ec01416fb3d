//! Everything survives a restart, and bad documents never do.

#![allow(clippy::unwrap_used)]

use vitrina_admin::session::AdminSessionStore;
use chrono::Weekday;
use rust_decimal::Decimal;
use vitrina_core::{
    BannerId, BannerUpdate, CategoryId, CategoryUpdate, CouponId, CouponUpdate, ProductId,
    QuickCategoryId, QuickCategoryUpdate,
};
use vitrina_integration_tests::{TestContext, fixed_now};
use vitrina_storefront::catalog::DirectorySeed;
use vitrina_storefront::config::StorefrontConfig;
use vitrina_storefront::error::AppError;
use vitrina_storefront::state::AppState;
use vitrina_storefront::views::deal_of_the_day;

#[test]
fn test_state_survives_restart() {
    let ctx = TestContext::new().unwrap();
    {
        let mut state = ctx.open().unwrap();
        state
            .add_to_cart(&ProductId::new("p-004"), 2, fixed_now())
            .unwrap();
        state
            .catalog_mut()
            .set_deal_of_the_day(&ProductId::new("p-007"))
            .unwrap();
        let mut admin = AdminSessionStore::load(state.persistence().clone());
        admin.sign_in("ops", fixed_now()).unwrap();
    }

    let state = ctx.open().unwrap();
    assert_eq!(state.cart().cart_count(), 2);
    assert_eq!(state.cart().lines()[0].product.id, ProductId::new("p-004"));

    let deal = deal_of_the_day(state.catalog()).unwrap();
    assert_eq!(deal.id, ProductId::new("p-007"));
    let deals = state
        .catalog()
        .products()
        .iter()
        .filter(|p| p.is_deal_of_the_day)
        .count();
    assert_eq!(deals, 1);

    let admin = AdminSessionStore::load(state.persistence().clone());
    assert_eq!(admin.current().unwrap().username, "ops");
}

#[test]
fn test_every_collection_survives_restart() {
    let ctx = TestContext::new().unwrap();
    let (products, categories, banners, quick, coupons, content, settings) = {
        let mut state = ctx.open().unwrap();
        let catalog = state.catalog_mut();
        catalog
            .update_category(
                &CategoryId::new("c-audio"),
                CategoryUpdate {
                    name: Some("Audio y sonido".to_string()),
                    ..CategoryUpdate::default()
                },
            )
            .unwrap();
        catalog
            .update_banner(
                &BannerId::new("b-3"),
                BannerUpdate {
                    is_active: Some(true),
                    ..BannerUpdate::default()
                },
            )
            .unwrap();
        catalog
            .update_quick_category(
                &QuickCategoryId::new("q-1"),
                QuickCategoryUpdate {
                    position: Some(5),
                    ..QuickCategoryUpdate::default()
                },
            )
            .unwrap();
        catalog
            .update_coupon(
                &CouponId::new("cp-1"),
                CouponUpdate {
                    value: Some(Decimal::from(12)),
                    ..CouponUpdate::default()
                },
            )
            .unwrap();
        let mut content = catalog.site_content().unwrap().clone();
        content.product_stage.title = "Lo más vendido".to_string();
        catalog.set_site_content(content).unwrap();
        catalog
            .set_daily_goal(Weekday::Fri, Decimal::from(275))
            .unwrap();
        (
            catalog.products().to_vec(),
            catalog.categories().to_vec(),
            catalog.banners().to_vec(),
            catalog.quick_categories().to_vec(),
            catalog.coupons().to_vec(),
            catalog.site_content().cloned(),
            catalog.settings().clone(),
        )
    };

    let state = ctx.open().unwrap();
    let after = state.catalog();
    assert_eq!(after.products(), products.as_slice());
    assert_eq!(after.categories(), categories.as_slice());
    assert_eq!(after.categories()[0].name, "Audio y sonido");
    assert_eq!(after.banners(), banners.as_slice());
    assert_eq!(after.quick_categories(), quick.as_slice());
    assert_eq!(after.coupons(), coupons.as_slice());
    assert_eq!(after.site_content(), content.as_ref());
    assert_eq!(
        after.site_content().unwrap().product_stage.title,
        "Lo más vendido"
    );
    assert_eq!(after.settings(), &settings);
    assert_eq!(after.settings().goal_for(Weekday::Fri), Decimal::from(275));
}

#[test]
fn test_corrupt_documents_fall_back() {
    let ctx = TestContext::new().unwrap();
    drop(ctx.open().unwrap());

    std::fs::write(ctx.dir.path().join("products.json"), "{ not json").unwrap();
    std::fs::write(
        ctx.dir.path().join("cart-state.json"),
        r#"[{"product": {"id": ""}, "quantity": 0}]"#,
    )
    .unwrap();

    let state = ctx.open().unwrap();
    assert_eq!(state.catalog().products().len(), 9);
    assert!(state.cart().is_empty());
}

#[test]
fn test_reseed_restores_catalog() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();
    assert!(state.catalog_mut().delete_product(&ProductId::new("p-001")));
    assert_eq!(state.catalog().products().len(), 8);

    state
        .reseed(&DirectorySeed::new(ctx.config.seed_dir.clone()))
        .unwrap();
    assert_eq!(state.catalog().products().len(), 9);
    assert_eq!(ctx.open().unwrap().catalog().products().len(), 9);
}

#[test]
fn test_invalid_seed_leaves_catalog_alone() {
    let ctx = TestContext::new().unwrap();
    let mut state = ctx.open().unwrap();

    let bad_seed = tempfile::tempdir().unwrap();
    std::fs::write(
        bad_seed.path().join("products.json"),
        r#"[{"id": "", "name": "Broken"}]"#,
    )
    .unwrap();

    let err = state
        .reseed(&DirectorySeed::new(bad_seed.path()))
        .unwrap_err();
    assert!(matches!(err, AppError::Seed(_)));
    assert_eq!(state.catalog().products().len(), 9);
}

#[test]
fn test_disabled_persistence_forgets() {
    let config = StorefrontConfig {
        data_dir: None,
        seed_dir: vitrina_integration_tests::seed_dir(),
        ..StorefrontConfig::default()
    };
    let mut state = AppState::new(config.clone()).unwrap();
    assert!(!state.persistence().is_enabled());
    assert_eq!(state.catalog().products().len(), 9);
    state
        .add_to_cart(&ProductId::new("p-002"), 1, fixed_now())
        .unwrap();
    assert_eq!(state.cart().cart_count(), 1);

    assert!(AppState::new(config).unwrap().cart().is_empty());
}
