//! Slider attack tables. Each square owns a slice of a shared attack table, indexed either by
//! a magic multiplication or, with the `fast-pext` feature, by a `pext` of the occupancy.

use super::prng::PRNG;
use crate::core::bitboard::pext;
use crate::core::masks::*;

/// Size of the rook attack table.
const ROOK_M_SIZE: usize = 102_400;
/// Size of the bishop attack table.
const BISHOP_M_SIZE: usize = 5248;

const B_DELTAS: [i8; 4] = [7, 9, -9, -7];
const R_DELTAS: [i8; 4] = [8, 1, -8, -1];

const SEEDS: [u64; 8] = [728, 10_316, 55_013, 32_803, 12_281, 15_100, 16_645, 255];

lazy_static! {
    static ref BISHOP_TABLE: MagicTable = MagicTable::generate(BISHOP_M_SIZE, &B_DELTAS);
    static ref ROOK_TABLE: MagicTable = MagicTable::generate(ROOK_M_SIZE, &R_DELTAS);
}

/// Forces both tables to be built.
#[cold]
pub fn init_magics() {
    lazy_static::initialize(&BISHOP_TABLE);
    lazy_static::initialize(&ROOK_TABLE);
}

#[inline(always)]
pub fn bishop_attacks(occupied: u64, square: u8) -> u64 {
    BISHOP_TABLE.attacks(occupied, square)
}

#[inline(always)]
pub fn rook_attacks(occupied: u64, square: u8) -> u64 {
    ROOK_TABLE.attacks(occupied, square)
}

/// For a certain square: the relevant occupancy mask, the magic number, the shift, and the
/// offset of the square's slice inside the attack table.
#[derive(Copy, Clone, Default)]
struct SMagic {
    offset: usize,
    mask: u64,
    magic: u64,
    shift: u32,
}

impl SMagic {
    #[inline(always)]
    fn index(&self, occupied: u64) -> usize {
        if cfg!(feature = "fast-pext") {
            pext(occupied, self.mask) as usize
        } else {
            ((occupied & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
        }
    }
}

struct MagicTable {
    magics: [SMagic; 64],
    attacks: Vec<u64>,
}

impl MagicTable {
    #[inline(always)]
    fn attacks(&self, occupied: u64, square: u8) -> u64 {
        let entry = &self.magics[square as usize];
        self.attacks[entry.offset + entry.index(occupied)]
    }

    #[cold]
    fn generate(table_size: usize, deltas: &[i8; 4]) -> MagicTable {
        let mut magics = [SMagic::default(); 64];
        let mut attacks: Vec<u64> = vec![0; table_size];

        // Occupancy permutations of the mask and the reference attacks for each.
        let mut occupancy: Vec<u64> = vec![0; 4096];
        let mut reference: Vec<u64> = vec![0; 4096];
        // Marks which attempt last wrote an index, so the table need not be cleared.
        let mut age: Vec<i32> = vec![0; 4096];
        let mut current: i32 = 0;
        let mut offset: usize = 0;

        for s in 0..64u8 {
            // Board edges are not part of the relevant occupancy unless the square is on them.
            let edges: u64 = ((RANK_1 | RANK_8) & !RANK_BB[(s >> 3) as usize])
                | ((FILE_A | FILE_H) & !FILE_BB[(s & 7) as usize]);
            let mask: u64 = sliding_attack(deltas, s, 0) & !edges;
            let shift: u32 = 64 - mask.count_ones();

            // Carry-rippler enumeration of all subsets of the mask.
            let mut size: usize = 0;
            let mut b: u64 = 0;
            loop {
                occupancy[size] = b;
                reference[size] = sliding_attack(deltas, s, b);
                size += 1;
                b = b.wrapping_sub(mask) & mask;
                if b == 0 {
                    break;
                }
            }

            let mut entry = SMagic {
                offset,
                mask,
                magic: 0,
                shift,
            };

            if cfg!(feature = "fast-pext") {
                for i in 0..size {
                    attacks[offset + entry.index(occupancy[i])] = reference[i];
                }
            } else {
                let mut rng = PRNG::init(SEEDS[(s >> 3) as usize]);
                loop {
                    let magic = loop {
                        let m = rng.sparse_rand();
                        if (m.wrapping_mul(mask) >> 56).count_ones() >= 6 {
                            break m;
                        }
                    };
                    entry.magic = magic;
                    current += 1;

                    let mut i = 0;
                    while i < size {
                        let index = entry.index(occupancy[i]);
                        if age[index] < current {
                            age[index] = current;
                            attacks[offset + index] = reference[i];
                        } else if attacks[offset + index] != reference[i] {
                            break;
                        }
                        i += 1;
                    }
                    if i >= size {
                        break;
                    }
                }
            }

            magics[s as usize] = entry;
            offset += size;
        }
        assert_eq!(offset, table_size);
        MagicTable { magics, attacks }
    }
}

/// Returns the sliding attacks from a square along four directions. Includes the first
/// occupied square on each ray, but stops before going further.
fn sliding_attack(deltas: &[i8; 4], sq: u8, occupied: u64) -> u64 {
    let mut attack: u64 = 0;
    for delta in deltas.iter() {
        let mut prev = sq as i16;
        let mut s = prev + *delta as i16;
        while (0..64).contains(&s) && file_rank_step(prev as u8, s as u8) {
            attack |= 1u64 << s;
            if occupied & (1u64 << s) != 0 {
                break;
            }
            prev = s;
            s += *delta as i16;
        }
    }
    attack
}

#[inline]
fn file_rank_step(a: u8, b: u8) -> bool {
    let df = (a & 7).abs_diff(b & 7);
    let dr = (a >> 3).abs_diff(b >> 3);
    df.max(dr) == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ray_walk() {
        let occupancies = [0u64, 0x0000_1020_0400_8100, 0x00FF_0000_0000_FF00, !0u64];
        for s in 0..64u8 {
            for occ in occupancies.iter() {
                assert_eq!(rook_attacks(*occ, s), sliding_attack(&R_DELTAS, s, *occ));
                assert_eq!(bishop_attacks(*occ, s), sliding_attack(&B_DELTAS, s, *occ));
            }
        }
    }

    #[test]
    fn corner_rook_empty_board() {
        assert_eq!(rook_attacks(0, 0), (FILE_A | RANK_1) & !1);
    }
}
