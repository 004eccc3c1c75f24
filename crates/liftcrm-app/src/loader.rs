// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ApiError, InvoiceApi, LookupEntity, LookupId, LookupKind, LookupOption, SelectControl};

/// Refreshes `select` from the lookup list for `kind`, keeping `current`
/// selected when the server still returns it. A failed fetch leaves the
/// select in its error state; the rest of the page is unaffected.
pub fn load_options<A: InvoiceApi + ?Sized>(
    api: &A,
    kind: LookupKind,
    select: &mut SelectControl,
    current: Option<LookupId>,
) -> bool {
    match fetch_options(api, kind, LookupEntity::to_option) {
        Ok(options) => {
            select.rebuild(options, current);
            true
        }
        Err(error) => {
            tracing::warn!(endpoint = kind.endpoint(), %error, "loading lookup options failed");
            select.fail();
            false
        }
    }
}

/// Options for a line-item selector, labelled with the item's sale price.
pub fn load_item_choices<A: InvoiceApi + ?Sized>(api: &A) -> Result<Vec<LookupOption>, ApiError> {
    fetch_options(api, LookupKind::Item, |entity| {
        LookupOption::new(entity.id, entity.priced_label())
    })
}

pub fn fetch_options<A, F>(api: &A, kind: LookupKind, to_option: F) -> Result<Vec<LookupOption>, ApiError>
where
    A: InvoiceApi + ?Sized,
    F: Fn(&LookupEntity) -> LookupOption,
{
    let entities = api.list_lookups(kind)?;
    tracing::debug!(endpoint = kind.endpoint(), count = entities.len(), "lookup list loaded");
    Ok(entities.iter().map(to_option).collect())
}
