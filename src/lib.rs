//! Portal - action layer of a science gateway's workspace and data files UI
//!
//! This library turns user intents (list jobs, submit a job, manage data
//! files, fetch allocations, push keys to a system) into calls against the
//! portal's REST backend and into the sequence of actions that update one
//! shared UI store.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`store`] - Actions, application state and the single-writer store
//! * [`orchestrator`] - Sagas and the watchers that schedule them
//! * [`api`] - Portal backend client and error type
//! * [`entities`] - Jobs, files, systems and allocations
//! * [`config`] - Application configuration management
//! * [`logger`] - Logging setup

/// Portal backend API client
pub mod api;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Session cookie storage
pub mod cookies;

/// Backend value objects and the pure rules built on them
pub mod entities;

/// Logging utilities for debugging and error tracking
pub mod logger;

/// Sagas, watchers and background task tracking
pub mod orchestrator;

/// Action definitions, reducer and store
pub mod store;
