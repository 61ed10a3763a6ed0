/// Reported by [`DownloadClient::percent_progress`](crate::DownloadClient::percent_progress)
/// before any transfer has started.
pub const UNKNOWN_PROGRESS: i32 = -1;

/// Whole percentage of `progress` over `total`, rounded down.
///
/// An unknown (zero) total yields `0`. The result is clamped to `100` so a
/// source that grew mid-transfer cannot report more than complete.
///
/// # Examples
///
/// ```
/// use carrier_fetch::core::percent;
///
/// assert_eq!(percent(4096, 10000), 40);
/// assert_eq!(percent(10, 0), 0);
/// ```
pub fn percent(progress: u64, total: u64) -> i32 {
    if total == 0 {
        return 0;
    }
    let pct = u128::from(progress) * 100 / u128::from(total);
    pct.min(100) as i32
}
