//! Integration tests for the character repository.
//!
//! Exercises `find_by_names` and `search` against a real database:
//! - Batch lookup returns exactly the names that exist
//! - Filters, ordering and over-fetch pagination
//! - Validation and cancellation short-circuit before the store
//!
//! Requires `DATABASE_URL` pointing at a PostgreSQL server.

use assert_matches::assert_matches;
use sqlx::PgPool;
use teyvat_core::character::{Element, Region, WeaponKind};
use teyvat_core::filter::{CharacterFilterCriteria, ComparisonCriterion, ComparisonOperator};
use teyvat_core::order::{CharacterOrderField, OrderDirection};
use teyvat_core::search::{SearchArgs, SearchArgsError};
use teyvat_db::error::CharacterRepoError;
use teyvat_db::repositories::{CharacterRepo, CharacterRepoConfig};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Seed {
    name: &'static str,
    element: Element,
    weapon_kind: WeaponKind,
    region: Region,
    health: i32,
    attack: i32,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Diluc",
        element: Element::Pyro,
        weapon_kind: WeaponKind::Claymore,
        region: Region::Mondstadt,
        health: 12_981,
        attack: 335,
    },
    Seed {
        name: "Klee",
        element: Element::Pyro,
        weapon_kind: WeaponKind::Catalyst,
        region: Region::Mondstadt,
        health: 10_287,
        attack: 311,
    },
    Seed {
        name: "Zhongli",
        element: Element::Geo,
        weapon_kind: WeaponKind::Polearm,
        region: Region::Liyue,
        health: 14_695,
        attack: 251,
    },
    Seed {
        name: "Xiangling",
        element: Element::Pyro,
        weapon_kind: WeaponKind::Polearm,
        region: Region::Liyue,
        health: 10_875,
        attack: 225,
    },
];

async fn seed(pool: &PgPool) {
    for seed in SEEDS {
        sqlx::query(
            "INSERT INTO characters \
                 (name, rarelity, element, health, attack, defence, unique_ability, \
                  unique_ability_score, element_energy, region, weapon_kind) \
             VALUES ($1, 5, $2, $3, $4, 700, 'CRIT_RATE', 0.192, 40, $5, $6)",
        )
        .bind(seed.name)
        .bind(seed.element.as_str())
        .bind(seed.health)
        .bind(seed.attack)
        .bind(seed.region.as_str())
        .bind(seed.weapon_kind.as_str())
        .execute(pool)
        .await
        .unwrap();
    }
}

fn repo(pool: PgPool) -> CharacterRepo {
    CharacterRepo::new(pool, CharacterRepoConfig::default())
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn row_names(rows: &[teyvat_db::models::character::Character]) -> Vec<&str> {
    rows.iter().map(|c| c.name.as_str()).collect()
}

// ---------------------------------------------------------------------------
// find_by_names
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_by_names_returns_existing_subset(pool: PgPool) {
    seed(&pool).await;
    let repo = repo(pool);

    let found = repo
        .find_by_names(&names(&["Diluc", "Klee", "Unknown"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found["Diluc"].name, "Diluc");
    assert_eq!(found["Diluc"].weapon_kind, WeaponKind::Claymore);
    assert_eq!(found["Klee"].element, Element::Pyro);
    assert!(!found.contains_key("Unknown"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_by_names_decodes_full_row(pool: PgPool) {
    seed(&pool).await;
    let repo = repo(pool);

    let found = repo
        .find_by_names(&names(&["Zhongli"]), &CancellationToken::new())
        .await
        .unwrap();

    let zhongli = &found["Zhongli"];
    assert_eq!(zhongli.region, Region::Liyue);
    assert_eq!(zhongli.health, 14_695);
    assert_eq!(zhongli.unique_ability.kind, "CRIT_RATE");
    assert!((zhongli.unique_ability.score - 0.192).abs() < f64::EPSILON);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_stored_enum_decodes_as_unknown(pool: PgPool) {
    sqlx::query(
        "INSERT INTO characters \
             (name, rarelity, element, health, attack, defence, unique_ability, \
              unique_ability_score, element_energy, region, weapon_kind) \
         VALUES ('Traveler', 5, 'VOID', 10875, 212, 682, 'ATK', 0.24, 60, 'KHAENRIAH', 'SWORD')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let repo = repo(pool);

    let found = repo
        .find_by_names(&names(&["Traveler"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(found["Traveler"].element, Element::Unknown);
    assert_eq!(found["Traveler"].region, Region::Unknown);
    assert_eq!(found["Traveler"].weapon_kind, WeaponKind::Sword);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_by_names_with_no_names_is_empty(pool: PgPool) {
    let repo = repo(pool);
    let found = repo
        .find_by_names(&[], &CancellationToken::new())
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_lookup_reports_cancellation(pool: PgPool) {
    seed(&pool).await;
    let repo = repo(pool);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = repo.find_by_names(&names(&["Diluc"]), &cancel).await;
    assert_matches!(result, Err(CharacterRepoError::Cancelled));
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_more_rows_than_limit_has_next(pool: PgPool) {
    seed(&pool).await;
    let repo = repo(pool);

    let args = SearchArgs::new(3).with_order(CharacterOrderField::Health, OrderDirection::Desc);
    let page = repo.search(&args, &CancellationToken::new()).await.unwrap();

    assert!(page.has_next);
    assert_eq!(row_names(&page.rows), vec!["Zhongli", "Diluc", "Xiangling"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_exactly_limit_rows_is_last_page(pool: PgPool) {
    seed(&pool).await;
    let repo = repo(pool);

    let args = SearchArgs::new(4).with_order(CharacterOrderField::Attack, OrderDirection::Asc);
    let page = repo.search(&args, &CancellationToken::new()).await.unwrap();

    assert!(!page.has_next);
    assert_eq!(
        row_names(&page.rows),
        vec!["Xiangling", "Zhongli", "Klee", "Diluc"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_applies_all_criteria(pool: PgPool) {
    seed(&pool).await;
    let repo = repo(pool);

    let criteria = CharacterFilterCriteria {
        element: Some(Element::Pyro),
        health: Some(ComparisonCriterion::new(ComparisonOperator::Gte, 10_500_u32)),
        attack: Some(ComparisonCriterion::new(ComparisonOperator::Lt, 300_i64)),
        ..Default::default()
    };
    let args = SearchArgs::new(10).with_criteria(criteria);
    let page = repo.search(&args, &CancellationToken::new()).await.unwrap();

    assert!(!page.has_next);
    assert_eq!(row_names(&page.rows), vec!["Xiangling"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn float_operand_compares_against_integer_column(pool: PgPool) {
    seed(&pool).await;
    let repo = repo(pool);

    let criteria = CharacterFilterCriteria {
        health: Some(ComparisonCriterion::new(ComparisonOperator::Gt, 12_981.5)),
        ..Default::default()
    };
    let page = repo
        .search(&SearchArgs::new(10).with_criteria(criteria), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(row_names(&page.rows), vec!["Zhongli"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_args_fail_validation(pool: PgPool) {
    let repo = repo(pool);
    let args = SearchArgs {
        limit: 0,
        order_field: Some(CharacterOrderField::Health),
        ..Default::default()
    };

    let err = repo
        .search(&args, &CancellationToken::new())
        .await
        .unwrap_err();

    let CharacterRepoError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(
        errors.errors(),
        &[SearchArgsError::InvalidOrderDirection, SearchArgsError::InvalidLimit]
    );
}
