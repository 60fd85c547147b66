//! # Session Booking Bot
//!
//! A Telegram bot for booking sessions with a specialist, with a chat-based admin panel.
//!
//! ## Features
//! - Pick a specialist, then an urgent delay or a time of day
//! - Name and phone capture, stored as a confirmed booking
//! - Best-effort notification of every admin on each new booking
//! - Admin panel for specialists, time slots, bookings and statistics
//! - Persistent storage with SQLite

/// Telegram commands, update routing and dialogue plumbing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Error type shared by the store and the flows
pub mod error;
/// Conversation state machines for clients and admins
pub mod flow;
/// HTTP health and statistics endpoints
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
