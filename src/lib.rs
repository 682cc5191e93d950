pub mod board;
pub mod board_fetch;
pub mod csv_text;
pub mod grouping;
pub mod http_client;
pub mod intake;
pub mod publish;
pub mod state;
