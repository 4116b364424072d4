use crate::input::InputItem;

/// One fixed-size slice of the input, tagged for log lines.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// 1-based sequence number.
    pub seq: usize,
    /// Total number of batches in this run.
    pub total: usize,
    pub items: &'a [InputItem],
}

/// Lazily partition `items` into batches of at most `batch_size`,
/// preserving order with no overlap or gaps; the last batch may be
/// short. Restartable: call again for a fresh pass.
pub fn split_batches(items: &[InputItem], batch_size: usize) -> impl Iterator<Item = Batch<'_>> {
    let size = batch_size.max(1);
    let total = items.len().div_ceil(size);
    items
        .chunks(size)
        .enumerate()
        .map(move |(i, chunk)| Batch {
            seq: i + 1,
            total,
            items: chunk,
        })
}
