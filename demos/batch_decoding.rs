use inflate64::BatchDecompressor;
use std::time::Instant;

/// Frames a payload as a single stored block, the simplest valid stream.
fn stored_stream(payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= 0xFFFF);
    let len = payload.len() as u16;
    let mut stream = vec![0x01];
    stream.extend_from_slice(&len.to_le_bytes());
    stream.extend_from_slice(&(len ^ 0xFFFF).to_le_bytes());
    stream.extend_from_slice(payload);
    stream
}

fn main() {
    let payloads = vec![
        b"First archive member.".repeat(100),
        b"Second archive member, a bit longer.".repeat(200),
        b"Third.".to_vec(),
        vec![b'A'; 10000],
    ];

    let streams: Vec<Vec<u8>> = payloads.iter().map(|p| stored_stream(p)).collect();
    let inputs: Vec<&[u8]> = streams.iter().map(|s| s.as_slice()).collect();

    println!("Batch decoding {} streams...", inputs.len());
    let start = Instant::now();

    let decompressor = BatchDecompressor::new();
    let results = decompressor.decompress_batch(&inputs);

    let duration = start.elapsed();
    println!("Decoding took: {:?}", duration);

    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(data) => {
                assert_eq!(data, &payloads[i]);
                println!(
                    "Item {}: {} compressed bytes -> {} decoded bytes",
                    i,
                    inputs[i].len(),
                    data.len()
                );
            }
            Err(e) => println!("Item {}: failed: {}", i, e),
        }
    }
}
