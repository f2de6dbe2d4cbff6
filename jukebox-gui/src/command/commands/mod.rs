pub mod cmd_get_jukebox;
pub mod cmd_jukebox_reload;
