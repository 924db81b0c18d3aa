// Copyright (c) 2018-2025 The Botho Foundation

/// The constant used for hash-to-curve to produce the burn address spend
/// public key.
pub const BURN_ADDRESS_DOMAIN_SEPARATOR: &str = "prv_burn_address_spend_public";

/// Domain separator for deriving the burn address view key.
pub const BURN_ADDRESS_VIEW_DOMAIN_SEPARATOR: &str = "prv_burn_address_view_private";
