//! Integration tests for production groups, settings, and rounding tiers.

use assert_matches::assert_matches;
use printshop_core::error::CoreError;
use printshop_core::pricing::{PricingRule, PricingType, RoundingCategory, RoundingTier};
use printshop_db::models::production_group::CreateProductionGroup;
use printshop_db::models::production_setting::{
    CreateProductionSetting, UpdateProductionSetting,
};
use printshop_db::repositories::{ProductionGroupRepo, ProductionSettingRepo, RoundingRepo};
use printshop_db::DbError;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_group(pool: &PgPool, parent_id: Option<i64>, name: &str) -> i64 {
    ProductionGroupRepo::create(
        pool,
        &CreateProductionGroup {
            parent_id,
            name: name.to_string(),
            sort_order: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_setting(group_id: i64, pricing_type: &str, params: serde_json::Value) -> CreateProductionSetting {
    CreateProductionSetting {
        production_group_id: group_id,
        name: "Digital print".to_string(),
        pricing_type: pricing_type.to_string(),
        pricing_params: params,
        setting_fee: Some(Decimal::from(3000)),
        print_method: Some("indigo".to_string()),
        vendor: None,
    }
}

// ---------------------------------------------------------------------------
// Test: groups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_group_tree(pool: PgPool) {
    let root = new_group(&pool, None, "Printing").await;
    let child = new_group(&pool, Some(root), "Digital").await;

    let children = ProductionGroupRepo::list_children(&pool, root).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child);

    let all = ProductionGroupRepo::list(&pool).await.unwrap();
    assert_eq!(all[0].id, root, "roots sort first");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_root_group_name_rejected(pool: PgPool) {
    new_group(&pool, None, "Printing").await;
    let result = ProductionGroupRepo::create(
        &pool,
        &CreateProductionGroup {
            parent_id: None,
            name: "Printing".to_string(),
            sort_order: None,
        },
    )
    .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Test: settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_setting_stores_resolved_rule(pool: PgPool) {
    let group = new_group(&pool, None, "Printing").await;
    let input = new_setting(group, "per_sheet", json!({ "base_price": "120", "ignored": 1 }));
    let rule = input.rule().unwrap();

    let setting = ProductionSettingRepo::create(&pool, &input, &rule).await.unwrap();
    assert_eq!(setting.pricing_type, "per_sheet");
    assert_eq!(setting.setting_fee, Decimal::from(3000));
    assert!(setting.pricing_params.get("ignored").is_none(), "only declared fields are kept");

    let reloaded = setting.rule().unwrap();
    assert_eq!(reloaded.pricing_type(), PricingType::PerSheet);
    assert_matches!(reloaded, PricingRule::PerSheet(p) if p.base_price == Decimal::from(120));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_setting_switches_strategy(pool: PgPool) {
    let group = new_group(&pool, None, "Finishing").await;
    let input = new_setting(group, "finishing_qty", json!({ "unit_price": "50" }));
    let rule = input.rule().unwrap();
    let setting = ProductionSettingRepo::create(&pool, &input, &rule).await.unwrap();

    let patch = UpdateProductionSetting {
        pricing_type: Some("binding_page".to_string()),
        pricing_params: Some(json!({ "price_per_page": "15" })),
        ..Default::default()
    };
    let merged = patch.merged_rule(&setting).unwrap();
    let updated = ProductionSettingRepo::update(&pool, setting.id, &patch, merged.as_ref())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.pricing_type, "binding_page");
    assert_eq!(updated.name, setting.name);
    assert_matches!(updated.rule(), Ok(PricingRule::BindingPage(_)));
}

#[test]
fn test_merged_rule_rejects_unknown_type() {
    let patch = UpdateProductionSetting {
        pricing_type: Some("per_hour".to_string()),
        ..Default::default()
    };
    let current = printshop_db::models::production_setting::ProductionSetting {
        id: 1,
        production_group_id: 1,
        name: "x".to_string(),
        pricing_type: "per_sheet".to_string(),
        pricing_params: json!({ "base_price": "1" }),
        setting_fee: Decimal::ZERO,
        print_method: None,
        vendor: None,
        is_active: true,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };
    assert_matches!(
        patch.merged_rule(&current),
        Err(CoreError::UnsupportedPricingType(_))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_group_hides_inactive(pool: PgPool) {
    let group = new_group(&pool, None, "Printing").await;
    let input = new_setting(group, "per_sheet", json!({ "base_price": "100" }));
    let rule = input.rule().unwrap();
    let setting = ProductionSettingRepo::create(&pool, &input, &rule).await.unwrap();

    assert!(ProductionSettingRepo::deactivate(&pool, setting.id).await.unwrap());

    let active = ProductionSettingRepo::list_by_group(&pool, group, false).await.unwrap();
    assert!(active.is_empty());
    let all = ProductionSettingRepo::list_by_group(&pool, group, true).await.unwrap();
    assert_eq!(all.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: rounding tiers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seeded_rounding_table(pool: PgPool) {
    let table = RoundingRepo::load_table(&pool).await.unwrap();

    let indigo = table.tiers_for(Some(RoundingCategory::Indigo));
    assert_eq!(indigo.len(), 3);
    assert_eq!(indigo[0].ceiling, Some(Decimal::from(500)));
    assert_eq!(indigo[2].ceiling, None);

    let fallback = table.tiers_for(None);
    assert_eq!(fallback, table.tiers_for(Some(RoundingCategory::Inkjet)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_category(pool: PgPool) {
    let rows = RoundingRepo::replace_category(
        &pool,
        RoundingCategory::Frame,
        vec![
            RoundingTier { ceiling: None, unit: Decimal::from(500) },
            RoundingTier { ceiling: Some(Decimal::from(5000)), unit: Decimal::from(50) },
        ],
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ceiling, Some(Decimal::from(5000)), "stored in ceiling order");

    let table = RoundingRepo::load_table(&pool).await.unwrap();
    assert_eq!(table.tiers_for(Some(RoundingCategory::Frame)).len(), 2);
    assert_eq!(table.tiers_for(Some(RoundingCategory::Album)).len(), 2, "other categories untouched");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_category_rejects_bad_unit_without_deleting(pool: PgPool) {
    let result = RoundingRepo::replace_category(
        &pool,
        RoundingCategory::Indigo,
        vec![RoundingTier { ceiling: None, unit: Decimal::ZERO }],
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));

    let table = RoundingRepo::load_table(&pool).await.unwrap();
    assert_eq!(table.tiers_for(Some(RoundingCategory::Indigo)).len(), 3);
}
