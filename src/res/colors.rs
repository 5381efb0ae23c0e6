// 埋め込みメッセージの色

pub const EMBED_COLOR_SUCCESS: u32 = 0x00ff00;
pub const EMBED_COLOR_ERROR: u32 = 0xff0000;
pub const EMBED_COLOR_INFO: u32 = 0x00ae86;
pub const EMBED_COLOR_WARNING: u32 = 0xffaa00;
pub const EMBED_COLOR_BIRTHDAY: u32 = 0xff69b4;
