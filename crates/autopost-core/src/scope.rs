//! Scoped site switching
//!
//! A [`SiteScope`] switches the host to a site when created and restores
//! the previous site when dropped, so every exit path (early returns and
//! `?` included) leaves the host where it was. Scopes nest: entering a
//! scope through another scope restores to the outer site.

use std::ops::{Deref, DerefMut};

use autopost_host::{Host, SiteContext, SiteId};

use crate::Result;
use crate::guard::{ReentrancyGuard, Suppression};

/// Host switched to one site for the lifetime of the scope
pub struct SiteScope<'h> {
    host: &'h mut dyn Host,
    site: SiteId,
    _suppression: Option<Suppression>,
}

impl<'h> SiteScope<'h> {
    /// Switch to `site` for reading
    pub fn enter(host: &'h mut dyn Host, site: SiteId) -> Result<Self> {
        host.switch_to(site)?;
        Ok(Self {
            host,
            site,
            _suppression: None,
        })
    }

    /// Switch to `site` for writing.
    ///
    /// The guard stays engaged until the scope is dropped, so saves caused
    /// by writes through this scope are not dispatched again.
    pub fn for_writes(host: &'h mut dyn Host, site: SiteId, guard: &ReentrancyGuard) -> Result<Self> {
        let suppression = guard.engage();
        host.switch_to(site)?;
        Ok(Self {
            host,
            site,
            _suppression: Some(suppression),
        })
    }

    /// Site this scope switched to
    pub fn site(&self) -> SiteId {
        self.site
    }
}

impl<'h> Deref for SiteScope<'h> {
    type Target = dyn Host + 'h;

    fn deref(&self) -> &Self::Target {
        self.host
    }
}

impl<'h> DerefMut for SiteScope<'h> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.host
    }
}

impl Drop for SiteScope<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.host.restore() {
            tracing::error!("Failed to restore site context after site {}: {}", self.site, e);
        }
    }
}
