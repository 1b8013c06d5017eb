use rand::Rng;

/// Item id epoch: 2024-01-01 00:00:00 UTC
const ITEM_ID_EPOCH_MS: i64 = 1_704_067_200_000;

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Id for the line item at `index` of an order being created
///
/// `<millis since epoch, hex><16 random bits, hex>-<index>`. The time prefix
/// keeps ids from different orders apart; the index keeps items created in
/// the same millisecond of one order apart even when the random bits repeat.
pub fn item_id(index: usize) -> String {
    let elapsed = (now_millis() - ITEM_ID_EPOCH_MS).max(0);
    let salt: u16 = rand::thread_rng().gen_range(0..=u16::MAX);
    format!("{:x}{:04x}-{}", elapsed, salt, index)
}
