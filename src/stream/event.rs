//! Creation event record consumed by the trade cycle

/// A newly created token, as decoded by the transport
///
/// Fields the transport cannot supply are `None`. Consumers apply their own
/// safe default instead of treating absence as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationEvent {
    /// Token mint address
    pub mint: String,
    pub name: String,
    pub symbol: String,
    /// Creator (deployer) address
    pub creator: String,
    /// Liquidity in the pool, in SOL
    pub pool_size: Option<f64>,
    pub is_freezable: Option<bool>,
    pub lp_burned: Option<bool>,
    /// Liquidity was bundled with the launch
    pub is_lp_bundle: Option<bool>,
    /// Fraction of supply held by the developer (0.05 = 5%)
    pub dev_hold: Option<f64>,
    pub has_socials: Option<bool>,
}

impl CreationEvent {
    pub fn new(
        mint: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            mint: mint.into(),
            name: name.into(),
            symbol: symbol.into(),
            creator: creator.into(),
            pool_size: None,
            is_freezable: None,
            lp_burned: None,
            is_lp_bundle: None,
            dev_hold: None,
            has_socials: None,
        }
    }

    pub fn with_pool_size(mut self, sol: f64) -> Self {
        self.pool_size = Some(sol);
        self
    }

    pub fn with_dev_hold(mut self, fraction: f64) -> Self {
        self.dev_hold = Some(fraction);
        self
    }

    pub fn with_freezable(mut self, freezable: bool) -> Self {
        self.is_freezable = Some(freezable);
        self
    }

    pub fn with_lp_burned(mut self, burned: bool) -> Self {
        self.lp_burned = Some(burned);
        self
    }

    pub fn with_lp_bundle(mut self, bundled: bool) -> Self {
        self.is_lp_bundle = Some(bundled);
        self
    }

    pub fn with_socials(mut self, socials: bool) -> Self {
        self.has_socials = Some(socials);
        self
    }

    /// Pool size used for strategy selection; absent reads as zero
    pub fn pool_size_or_zero(&self) -> f64 {
        self.pool_size.unwrap_or(0.0)
    }
}
