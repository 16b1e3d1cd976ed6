use std::io::{Cursor, Read, Seek, SeekFrom};

use anyhow::{anyhow, Context, Result};

struct WavInfo {
    fmt_content: Vec<u8>,
    data_offset: u64,
    data_size: u32,
}

fn scan_wav(bytes: &[u8]) -> Result<WavInfo> {
    let mut cursor = Cursor::new(bytes);

    let mut id = [0u8; 4];
    cursor.read_exact(&mut id)?;
    if &id != b"RIFF" {
        return Err(anyhow!("Not a RIFF file"));
    }

    // Skip file size
    cursor.seek(SeekFrom::Current(4))?;

    cursor.read_exact(&mut id)?;
    if &id != b"WAVE" {
        return Err(anyhow!("Not a WAVE file"));
    }

    let mut fmt_content: Option<Vec<u8>> = None;
    let mut data_offset: Option<u64> = None;
    let mut data_size: Option<u32> = None;

    loop {
        let mut chunk_id = [0u8; 4];
        let n = cursor.read(&mut chunk_id)?;
        if n == 0 {
            break;
        }
        if n < 4 {
            return Err(anyhow!("Unexpected EOF reading chunk ID"));
        }

        let mut size_buf = [0u8; 4];
        cursor.read_exact(&mut size_buf)?;
        let chunk_size = u32::from_le_bytes(size_buf);

        // A declared size past the end of the buffer means a truncated
        // or corrupt segment
        let remaining = bytes.len() as u64 - cursor.stream_position()?;
        if chunk_size as u64 > remaining {
            return Err(anyhow!(
                "Chunk size {} exceeds remaining {} bytes",
                chunk_size,
                remaining
            ));
        }

        if &chunk_id == b"fmt " {
            let mut buf = vec![0u8; chunk_size as usize];
            cursor.read_exact(&mut buf)?;
            fmt_content = Some(buf);
        } else if &chunk_id == b"data" {
            data_offset = Some(cursor.stream_position()?);
            data_size = Some(chunk_size);
            break;
        } else {
            cursor.seek(SeekFrom::Current(chunk_size as i64))?;
        }
    }

    Ok(WavInfo {
        fmt_content: fmt_content.ok_or_else(|| anyhow!("Missing fmt chunk"))?,
        data_offset: data_offset.ok_or_else(|| anyhow!("Missing data chunk"))?,
        data_size: data_size.ok_or_else(|| anyhow!("Missing data chunk size"))?,
    })
}

/// Merge per-turn WAV segments into one in-memory WAV blob.
///
/// All segments must share the same fmt chunk (sample rate, channels,
/// bit depth); the synthesizer guarantees this when every segment comes
/// from the same voice model.
pub fn merge_wav_segments(segments: &[Vec<u8>]) -> Result<Vec<u8>> {
    if segments.is_empty() {
        return Err(anyhow!("No audio segments to merge"));
    }

    let mut total_data_size: u32 = 0;
    let mut infos = Vec::with_capacity(segments.len());

    let first_info = scan_wav(&segments[0]).context("Failed to parse first WAV segment")?;
    let base_fmt = first_info.fmt_content.clone();

    total_data_size += first_info.data_size;
    infos.push(first_info);

    for (i, segment) in segments.iter().enumerate().skip(1) {
        let info = scan_wav(segment).with_context(|| format!("Failed to parse WAV segment {}", i))?;

        if info.fmt_content != base_fmt {
            return Err(anyhow!(
                "WAV format mismatch in segment {}. All segments must have same sample rate/channels.",
                i
            ));
        }

        total_data_size += info.data_size;
        infos.push(info);
    }

    let mut out = Vec::with_capacity(44 + total_data_size as usize);

    out.extend_from_slice(b"RIFF");
    // File size = 4 (WAVE) + 8 (fmt hdr) + fmt_len + 8 (data hdr) + data_len
    let chunk_size = 4 + 8 + base_fmt.len() as u32 + 8 + total_data_size;
    out.extend_from_slice(&chunk_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&(base_fmt.len() as u32).to_le_bytes());
    out.extend_from_slice(&base_fmt);

    out.extend_from_slice(b"data");
    out.extend_from_slice(&total_data_size.to_le_bytes());

    for (info, segment) in infos.iter().zip(segments) {
        let start = info.data_offset as usize;
        let end = start + info.data_size as usize;
        out.extend_from_slice(&segment[start..end]);
    }

    Ok(out)
}

#[cfg(test)]
pub(crate) fn dummy_wav(size: u32, sample_rate: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"RIFF");
    let total_size = 36 + size;
    buf.extend_from_slice(&total_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    // PCM (1), Mono (1), SampleRate, ByteRate, BlockAlign (2), Bits (16)
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&vec![0u8; size as usize]);

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_wav_segments() {
        let merged =
            merge_wav_segments(&[dummy_wav(10, 22050), dummy_wav(20, 22050)]).unwrap();

        let info = scan_wav(&merged).unwrap();
        assert_eq!(info.data_size, 30);
        assert_eq!(info.fmt_content.len(), 16);
    }

    #[test]
    fn test_merge_rejects_mismatched_formats() {
        let result = merge_wav_segments(&[dummy_wav(10, 22050), dummy_wav(10, 44100)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_rejects_empty_input() {
        assert!(merge_wav_segments(&[]).is_err());
    }

    #[test]
    fn test_merge_rejects_non_wav_bytes() {
        let result = merge_wav_segments(&[b"definitely not audio".to_vec()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_rejects_overdeclared_data_size() {
        // The data chunk's size field sits at bytes 40..44; claim far
        // more data than the segment actually carries
        let mut wav = dummy_wav(4, 22050);
        wav[40..44].copy_from_slice(&64u32.to_le_bytes());

        let result = merge_wav_segments(&[wav]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_rejects_overdeclared_fmt_size() {
        let mut wav = dummy_wav(4, 22050);
        wav[16..20].copy_from_slice(&(u32::MAX).to_le_bytes());

        let result = merge_wav_segments(&[wav]);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_segment_round_trips_data() {
        let original = dummy_wav(16, 22050);
        let merged = merge_wav_segments(&[original.clone()]).unwrap();

        let original_info = scan_wav(&original).unwrap();
        let merged_info = scan_wav(&merged).unwrap();
        assert_eq!(merged_info.data_size, original_info.data_size);
        assert_eq!(merged_info.fmt_content, original_info.fmt_content);
    }
}
