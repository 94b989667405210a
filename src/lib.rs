pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod gateway;
pub mod paths;
pub mod types;

pub use board::{
    BoardAction, BoardConfig, BoardEffect, BoardHandle, BoardState, BoardViewModel,
    compute_board_view_model, reduce_board_state, spawn_board,
};
pub use config::Config;
pub use error::{MesaError, Result};
pub use gateway::{HttpGateway, TicketGateway, TicketQuery};
pub use types::{
    CurrentUser, Staff, Ticket, TicketId, TicketPage, TicketPriority, TicketStatus,
};
