//! Ranking catalog entries against a candidate object.
//!
//! Several datasources can plausibly own the field names found in one widget
//! (two layers of the same service share an item id, a url appears next to a
//! web map layer id, ...). Each entry is ranked by the strongest evidence found
//! in the serialized candidate and field references are rewritten in rank
//! order, so the most specific datasource claims a field name first.

use serde_json::Value;

use super::pattern::{self, PatternMode};
use crate::core::Result;
use crate::datasource::DatasourceInfo;

/// Strength of the evidence tying a datasource to a candidate object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortOrder {
    /// Layer-qualified url or a web map layer id was found.
    LayerReference = 1,
    /// Only the base service url was found.
    ServiceUrl = 2,
    /// Only the item id was found.
    ItemId = 3,
    /// No evidence at all.
    Unmatched = 4,
}

impl SortOrder {
    #[must_use]
    pub const fn rank(self) -> u32 {
        self as u32
    }
}

/// Rank of [`SortOrder::Unmatched`]; anything at or above it is excluded from plans.
pub const UNMATCHED_RANK: u32 = SortOrder::Unmatched.rank();

/// Rank `info` against `candidate`, the serialized form of an object.
///
/// Checks run in priority order and the first hit wins:
/// 1. url with `.layer<layerId>.` spliced in (needs url and numeric layer id)
/// 2. any of the web map layer `ids`
/// 3. the raw url
/// 4. the raw item id
pub fn sort_order(info: &DatasourceInfo, candidate: &str, mode: PatternMode) -> Result<SortOrder> {
    if let Some(layer_url) = pattern::layer_url_pattern(info, mode)?
        && layer_url.is_match(candidate)
    {
        return Ok(SortOrder::LayerReference);
    }

    if matches_any_id(info, candidate, mode)? {
        return Ok(SortOrder::LayerReference);
    }

    if let Some(url) = &info.url
        && pattern::compile(url, mode)?.is_match(candidate)
    {
        return Ok(SortOrder::ServiceUrl);
    }

    if let Some(item_id) = &info.item_id
        && pattern::compile(item_id, mode)?.is_match(candidate)
    {
        return Ok(SortOrder::ItemId);
    }

    Ok(SortOrder::Unmatched)
}

/// Whether any of `info.ids` occurs in `candidate`.
pub fn matches_any_id(info: &DatasourceInfo, candidate: &str, mode: PatternMode) -> Result<bool> {
    for id in &info.ids {
        if pattern::compile(id, mode)?.is_match(candidate) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Order in which datasources should rewrite `obj`.
///
/// Entries without evidence are dropped; the rest are sorted by rank, keeping
/// catalog order between equal ranks.
pub fn replace_order<'a>(
    obj: &Value,
    infos: &'a [DatasourceInfo],
    mode: PatternMode,
) -> Result<Vec<&'a DatasourceInfo>> {
    replace_order_with(obj, infos, |info, candidate| {
        sort_order(info, candidate, mode).map(SortOrder::rank)
    })
}

/// [`replace_order`] with a caller-supplied ranking.
///
/// `rank` sees each entry once together with the serialized object. Ranks at
/// or above [`UNMATCHED_RANK`] exclude the entry.
pub fn replace_order_with<'a, F>(
    obj: &Value,
    infos: &'a [DatasourceInfo],
    mut rank: F,
) -> Result<Vec<&'a DatasourceInfo>>
where
    F: FnMut(&DatasourceInfo, &str) -> Result<u32>,
{
    let candidate = serde_json::to_string(obj)?;

    let mut ranked = Vec::with_capacity(infos.len());
    for info in infos {
        let order = rank(info, &candidate)?;
        if order < UNMATCHED_RANK {
            ranked.push((order, info));
        }
    }

    // `sort_by_key` is stable, so equal ranks keep catalog order.
    ranked.sort_by_key(|(order, _)| *order);

    tracing::trace!(
        "Replace order: {:?}",
        ranked.iter().map(|(order, info)| (*order, info.label())).collect::<Vec<_>>()
    );

    Ok(ranked.into_iter().map(|(_, info)| info).collect())
}
