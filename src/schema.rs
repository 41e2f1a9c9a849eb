/// Column-name constants for fishing-effort-proxies.
/// Role-mapped input columns live in `Config`; these are the names the engine owns.

// ── Proxy output columns ────────────────────────────────────────────────────
pub mod proxy {
    pub const FEFF: &str = "Feff";
    pub const FGEAR: &str = "Fgear";
    pub const FDIST: &str = "Fdist";
    pub const FREALISED: &str = "Frealised";

    pub const ALL: [&str; 4] = [FEFF, FGEAR, FDIST, FREALISED];
}

// ── Gear efficiency (long form) ─────────────────────────────────────────────
pub mod efficiency {
    pub const EFFICIENCY: &str = "Efficiency";
}

// ── Default role → column mapping ───────────────────────────────────────────
pub mod defaults {
    pub const GEAR: &str = "gear";
    pub const SPATIAL: &str = "ices_rectangle";
    pub const TIME: &str = "year";
    pub const AREA: &str = "area";
    pub const SWEPT_AREA: &str = "swept_area";
    pub const SPECIES: &str = "species";
    pub const AGE: &str = "age";
    pub const ABUNDANCE: &str = "R";
}

// ── Scratch columns (never survive into outputs) ────────────────────────────
pub mod scratch {
    pub const ROW_COUNT: &str = "__row_count";
    pub const AGE_MIN: &str = "__age_min";
    pub const AGE_MAX: &str = "__age_max";
}
