//! Internal helpers for pixel copying and timestamp arithmetic.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy an RGB24 frame into a tightly packed buffer.
///
/// FFmpeg rows are often padded (stride > width × 3); the padding is
/// dropped so the result can go straight into [`image::RgbImage::from_raw`].
pub(crate) fn rgb_frame_to_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}

/// Rescale a PTS value from the stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Frame index of a PTS value, relative to the stream's first timestamp.
pub(crate) fn pts_to_frame_index(
    pts: i64,
    start_pts: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> u64 {
    let seconds = pts_to_seconds(pts.saturating_sub(start_pts), time_base).max(0.0);
    (seconds * frames_per_second).round() as u64
}

/// Container seek target (AV_TIME_BASE, microseconds) for a frame index.
///
/// `Input::seek` works on the default stream, whose timestamps are in
/// AV_TIME_BASE rather than the stream time base.
pub(crate) fn frame_index_to_seek_timestamp(frame_index: u64, frames_per_second: f64) -> i64 {
    let seconds = frame_index as f64 / frames_per_second;
    (seconds * 1_000_000.0) as i64
}
