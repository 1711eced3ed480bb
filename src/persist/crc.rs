//! CRC-32/MPEG-2.
//!
//! Register seeded with `0xFFFF_FFFF`, polynomial `0x04C1_1DB7`, bytes fed
//! MSB-first, no reflection, no final XOR.  Any reader of the retained
//! record must compute exactly this.

const POLY: u32 = 0x04C1_1DB7;
const INIT: u32 = 0xFFFF_FFFF;

pub fn crc32_mpeg2(data: &[u8]) -> u32 {
    let mut crc = INIT;
    for &byte in data {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}
