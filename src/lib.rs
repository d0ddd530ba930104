//! rollout — installs deployment archives into content-server environments
//!
//! An archive declares a set of components (services, project apps, web apps)
//! plus, for feature archives, an inventory of database layers. rollout
//! uploads the archive, reconciles every declared component against what the
//! target environment already runs (install vs. update), resolves the
//! source→destination layer mapping from a user expression, and reports one
//! result per component without ever aborting the run on a single failure.
//!
//! The remote environment itself is reached through the [`client::Environment`]
//! capability trait; this crate does not implement a wire protocol.

pub mod client;
pub mod descriptor;
pub mod error;
pub mod install;
pub mod layers;
pub mod params;
pub mod progress;
pub mod reconcile;
pub mod result;
pub mod scope;
