/// Integration tests against real SQLite stores and the stdio server
mod basic_integration;
mod reconcile_integration;
mod server_integration;
