// HEAD is the byte that marks the beginning of every frame, in both directions.
pub const HEAD: u8 = 0xFF;

// ADDRESS is the sensor address byte carried by command frames.
pub const ADDRESS: u8 = 0x01;

// FRAME_LEN is the size of every command and response frame.
pub const FRAME_LEN: usize = 9;

// PAYLOAD_LEN is the number of opcode-specific bytes in a frame.
pub const PAYLOAD_LEN: usize = 5;

// DEFAULT_RANGE is the detection range in ppm used when none is configured.
pub const DEFAULT_RANGE: u32 = 5000;

// ABC_ON is the payload byte that enables automatic baseline correction.
pub const ABC_ON: u8 = 0xA0;

// ABC_OFF is the payload byte that disables automatic baseline correction.
pub const ABC_OFF: u8 = 0x00;
