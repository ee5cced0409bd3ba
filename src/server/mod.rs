// ABOUTME: Server module for the TCP sample-stream broadcaster
// ABOUTME: Provides the listener, connection registry, encoders, and engine

mod capture_engine;
mod cli;
mod client_handler;
mod client_manager;
mod clock;
mod config;
mod encoder;
mod server;
mod signal_source;
mod tracker;

pub use capture_engine::{spawn_capture_engine, CaptureEngine};
pub use cli::ServerArgs;
pub use client_handler::handle_client;
pub use client_manager::{ClientManager, ConnectedClient, ConnectionId, Frame};
pub use clock::unix_millis;
pub use config::{ServerConfig, DEFAULT_PORT};
pub use encoder::{create_encoder, BinaryEncoder, FrameEncoder, TextEncoder, WireFormat};
pub use server::TcpExporter;
pub use signal_source::{SampleSource, TestSignalSource};
pub use tracker::ChannelStateTracker;
