//! Repository for the `characters` table.
//!
//! Read-only: rows are written by the offline importer. Both operations
//! render parameterized SQL through [`QueryBuilder`] and never interpolate
//! caller-supplied values into the statement text.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use sqlx::{PgPool, Postgres, QueryBuilder};
use teyvat_core::filter::{Operand, Predicate};
use teyvat_core::numeric::Numeric;
use teyvat_core::order::Order;
use teyvat_core::search::SearchArgs;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::error::{CharacterRepoError, QueryBuildError};
use crate::models::character::Character;
use crate::models::page::Page;

/// Column list shared across queries.
const COLUMNS: &str = "id, name, rarelity, element, health, attack, defence, \
     unique_ability, unique_ability_score, element_energy, region, weapon_kind";

/// PostgreSQL caps a single statement at `u16::MAX` bind parameters.
pub const MAX_BIND_PARAMETERS: usize = u16::MAX as usize;

/// Construction-time settings for [`CharacterRepo`].
#[derive(Debug, Clone)]
pub struct CharacterRepoConfig {
    /// Parent span for every query span. When disabled, queries attach to
    /// whatever span is current at call time.
    pub span: Span,
    /// Deadline applied to each store round-trip.
    pub query_timeout: Option<Duration>,
}

impl Default for CharacterRepoConfig {
    fn default() -> Self {
        Self {
            span: Span::none(),
            query_timeout: None,
        }
    }
}

/// Character lookups against the shared connection pool.
///
/// Holds no per-call state, so one instance may serve concurrent calls.
#[derive(Debug, Clone)]
pub struct CharacterRepo {
    pool: PgPool,
    config: CharacterRepoConfig,
}

impl CharacterRepo {
    pub fn new(pool: PgPool, config: CharacterRepoConfig) -> Self {
        Self { pool, config }
    }

    /// Fetch the characters whose `name` is in `names`, keyed by name.
    ///
    /// Names without a row are simply absent from the map.
    #[tracing::instrument(
        level = "debug",
        name = "find_characters_by_names",
        parent = &self.parent_span(),
        skip_all,
        fields(names = names.len(), found = tracing::field::Empty),
    )]
    pub async fn find_by_names(
        &self,
        names: &[String],
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, Character>, CharacterRepoError> {
        if names.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = find_by_names_query(names)?;
        let rows = self
            .run(query.build_query_as::<Character>().fetch_all(&self.pool), cancel)
            .await?;

        Span::current().record("found", rows.len());
        Ok(index_by_name(rows))
    }

    /// Filtered, ordered, paginated search.
    ///
    /// Requests `limit + 1` rows so `has_next` can be answered without a
    /// count query; the extra row is dropped from the returned page.
    #[tracing::instrument(
        level = "debug",
        name = "search_characters",
        parent = &self.parent_span(),
        skip_all,
        fields(
            order.field = args.order_field_name(),
            order.direction = args.order_direction_name(),
            limit = args.limit,
        ),
    )]
    pub async fn search(
        &self,
        args: &SearchArgs,
        cancel: &CancellationToken,
    ) -> Result<Page<Character>, CharacterRepoError> {
        if let Err(errors) = args.validate() {
            tracing::debug!(%errors, "Rejected search arguments");
            return Err(errors.into());
        }

        let predicates = args
            .criteria
            .as_ref()
            .map(|criteria| criteria.predicates())
            .unwrap_or_default();
        let mut query = search_query(&predicates, args.order(), args.limit)?;
        let rows = self
            .run(query.build_query_as::<Character>().fetch_all(&self.pool), cancel)
            .await?;

        Ok(Page::from_overfetch(rows, args.limit))
    }

    fn parent_span(&self) -> Span {
        if self.config.span.is_disabled() {
            Span::current()
        } else {
            self.config.span.clone()
        }
    }

    /// Await a store call, racing it against cancellation and the configured
    /// deadline.
    async fn run<T, F>(&self, fut: F, cancel: &CancellationToken) -> Result<T, CharacterRepoError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let query = async {
            match self.config.query_timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result.map_err(CharacterRepoError::from),
                    Err(_) => Err(CharacterRepoError::Timeout(limit)),
                },
                None => fut.await.map_err(CharacterRepoError::from),
            }
        };

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CharacterRepoError::Cancelled),
            result = query => result,
        };

        if let Err(err) = &result {
            tracing::warn!(error = %err, "Character query failed");
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Query rendering
// ---------------------------------------------------------------------------

fn check_bind_count(count: usize) -> Result<(), QueryBuildError> {
    if count > MAX_BIND_PARAMETERS {
        return Err(QueryBuildError::TooManyBindParameters {
            count,
            max: MAX_BIND_PARAMETERS,
        });
    }
    Ok(())
}

/// `SELECT ... WHERE name IN ($1, $2, ...)`. `names` must be non-empty.
fn find_by_names_query(names: &[String]) -> Result<QueryBuilder<'_, Postgres>, QueryBuildError> {
    check_bind_count(names.len())?;

    let mut query = QueryBuilder::new(format!("SELECT {COLUMNS} FROM characters WHERE name IN ("));
    let mut separated = query.separated(", ");
    for name in names {
        separated.push_bind(name.as_str());
    }
    separated.push_unseparated(")");
    Ok(query)
}

/// Conjunction of `predicates`, optional `ORDER BY`, then `LIMIT limit + 1`.
///
/// An order whose field or direction is unrecognized renders no `ORDER BY`.
fn search_query(
    predicates: &[Predicate],
    order: Option<Order>,
    limit: u32,
) -> Result<QueryBuilder<'static, Postgres>, QueryBuildError> {
    check_bind_count(predicates.len() + 1)?;

    let mut query = QueryBuilder::new(format!("SELECT {COLUMNS} FROM characters"));
    for (i, predicate) in predicates.iter().enumerate() {
        query
            .push(if i == 0 { " WHERE " } else { " AND " })
            .push(predicate.column.as_str())
            .push(" ")
            .push(predicate.comparison.as_sql())
            .push(" ");
        push_operand(&mut query, &predicate.operand)?;
    }

    if let Some((column, direction)) = order.and_then(|order| order.clause()) {
        query
            .push(" ORDER BY ")
            .push(column.as_str())
            .push(" ")
            .push(direction);
    }

    query.push(" LIMIT ").push_bind(i64::from(limit) + 1);
    Ok(query)
}

/// Bind an operand in the type family its subtype belongs to. PostgreSQL has
/// no unsigned integers, so unsigned operands must fit `BIGINT`.
fn push_operand(
    query: &mut QueryBuilder<'static, Postgres>,
    operand: &Operand,
) -> Result<(), QueryBuildError> {
    match operand {
        Operand::Text(value) => {
            query.push_bind(value.clone());
        }
        Operand::Int(value) | Operand::Numeric(Numeric::Int(value)) => {
            query.push_bind(*value);
        }
        Operand::Numeric(Numeric::UnsignedInt(value)) => {
            let value =
                i64::try_from(*value).map_err(|_| QueryBuildError::OperandOutOfRange(*value))?;
            query.push_bind(value);
        }
        Operand::Numeric(Numeric::Float(value)) => {
            if !value.is_finite() {
                return Err(QueryBuildError::NonFiniteOperand(*value));
            }
            query.push_bind(*value);
        }
        Operand::Numeric(Numeric::Unknown) => return Err(QueryBuildError::UnknownOperand),
    }
    Ok(())
}

fn index_by_name(rows: Vec<Character>) -> HashMap<String, Character> {
    rows.into_iter()
        .map(|character| (character.name.clone(), character))
        .collect()
}
