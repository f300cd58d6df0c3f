//! RFC 1071 Internet checksum.

/// Computes the Internet checksum of `data`.
///
/// The result is meant to be stored big-endian in the checksum field. When
/// computing it for a message, the checksum field must be zero.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum = sum.wrapping_add(u32::from(u16::from_be_bytes([word[0], word[1]])));
    }
    if let [last] = words.remainder() {
        // Odd length: pad with a zero byte.
        sum = sum.wrapping_add(u32::from(u16::from_be_bytes([*last, 0])));
    }

    sum = (sum >> 16) + (sum & 0xffff);
    // The fold above can carry once more.
    sum += sum >> 16;

    #[allow(clippy::cast_possible_truncation)]
    let folded = sum as u16;
    !folded
}

/// Returns `true` if `message` (checksum field included) has a valid checksum.
pub fn is_valid(message: &[u8]) -> bool {
    checksum(message) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn rfc_1071_example() {
        // Worked example from RFC 1071, section 3: sum 0x2ddf0 folds to 0xddf2.
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(!0xddf2_u16, checksum(&data));
    }

    #[test]
    fn empty_input() {
        assert_eq!(0xffff, checksum(&[]));
    }

    #[test]
    fn odd_length_is_padded_with_zero() {
        assert_eq!(checksum(&[0xab, 0xcd, 0xef, 0x00]), checksum(&[0xab, 0xcd, 0xef]));
    }

    #[test]
    fn double_fold_absorbs_carry() {
        // 0xffff + 0xffff + 0x0001 = 0x1ffff, first fold gives 0x10000.
        assert_eq!(!0x0001_u16, checksum(&[0xff, 0xff, 0xff, 0xff, 0x00, 0x01]));
    }

    #[test]
    fn matches_pnet_checksum() {
        let mut rng = rand::thread_rng();
        for len in [4_usize, 5, 7, 8, 63, 64, 1001] {
            let mut data = vec![0u8; len];
            rng.fill(&mut data[..]);
            let from_pnet = pnet_packet::util::checksum(&data, 1);
            // pnet skips word 1, the checksum field.
            data[2..4].fill(0);
            assert_eq!(from_pnet, checksum(&data));
        }
    }

    #[test]
    fn message_with_inserted_checksum_is_valid() {
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let len = rng.gen_range(4..256);
            let mut message = vec![0u8; len];
            rng.fill(&mut message[4..]);
            let sum = checksum(&message);
            message[2..4].copy_from_slice(&sum.to_be_bytes());
            assert!(is_valid(&message));
        }
    }

    #[test]
    fn single_bit_flip_is_detected() {
        let mut rng = rand::thread_rng();
        let mut message = vec![0u8; 64];
        rng.fill(&mut message[4..]);
        let sum = checksum(&message);
        message[2..4].copy_from_slice(&sum.to_be_bytes());

        for byte in 0..message.len() {
            for bit in 0..8 {
                let mut corrupted = message.clone();
                corrupted[byte] ^= 1 << bit;
                assert!(!is_valid(&corrupted), "flip of bit {bit} in byte {byte} went undetected");
            }
        }
    }
}
