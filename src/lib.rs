#![cfg_attr(not(test), no_std)]

//! Radio interrupt coordination layer for a BLE link-layer controller
//!
//! This library provides the platform glue between a 2.4 GHz radio
//! link-layer stack and the Cortex-M interrupt fabric, organized into
//! clear architectural layers:
//!
//! - `port`: Capability traits the platform must implement (NVIC access,
//!   task control, entropy)
//! - `radio`: Two-tier radio interrupt dispatch, class masking and
//!   radio-event priority management
//! - `irq`: Interrupt class bookkeeping (nesting counters, class masks)
//! - `stack`: Interfaces to the protocol backends the loops drive
//! - `process`: Background processing loops for the controller, key
//!   agreement and link-layer system work
//! - `context`: OS context-switch gating around radio activity
//! - `nvic`: Bare-metal `cortex-m` implementation of the port traits
//! - `rng`: Entropy fill helper for the controller's random source

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod context;
pub mod irq;
pub mod nvic;
pub mod port;
pub mod process;
pub mod radio;
pub mod rng;
pub mod stack;
