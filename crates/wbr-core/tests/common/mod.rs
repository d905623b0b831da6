pub mod wayback_server;
