use crate::frame::Gop;

/// Mean number of frames per GOP, key frame included.
pub fn average_gop_size(gops: &[Gop]) -> Option<f64> {
    if gops.is_empty() {
        return None;
    }
    let total: usize = gops.iter().map(Gop::frame_count).sum();
    Some(total as f64 / gops.len() as f64)
}

/// Whether every GOP has the same length. Needs at least two GOPs.
pub fn are_gops_fixed(gops: &[Gop]) -> Option<bool> {
    let (first, rest) = gops.split_first()?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.iter().all(|g| g.frame_count() == first.frame_count()))
}
