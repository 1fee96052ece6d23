pub mod game_code;
