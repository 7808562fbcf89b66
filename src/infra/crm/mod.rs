pub mod ghl_client;
