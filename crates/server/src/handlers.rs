pub mod card_data;
pub mod merchant;
pub mod notifications;
pub mod passes;
pub mod wallet_passes;
