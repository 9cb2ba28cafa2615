//! Static media addressed by naming convention.

use crate::prelude::ChunkId;

pub fn real_video_path(chunk: ChunkId) -> String {
    format!("/chunk_{}_real_h264.mp4", chunk)
}

pub fn simulation_video_path(chunk: ChunkId) -> String {
    format!("/chunk_{}_simulation_h264.mp4", chunk)
}

pub fn violation_video_path(car_id: &str) -> String {
    format!("/violations/car_{}_violation_h264.mp4", car_id)
}

/// Joins a base address and a convention path without doubling the slash.
pub fn media_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_naming_convention() {
        assert_eq!(real_video_path(3), "/chunk_3_real_h264.mp4");
        assert_eq!(simulation_video_path(3), "/chunk_3_simulation_h264.mp4");
        assert_eq!(
            violation_video_path("17"),
            "/violations/car_17_violation_h264.mp4"
        );
        assert_eq!(
            media_url("http://localhost:8000/", "/chunk_0_real_h264.mp4"),
            "http://localhost:8000/chunk_0_real_h264.mp4"
        );
    }
}
