use needletail::parse_fastx_reader;
use serde_json::Value;

use kmersketch::cmd::ComputeParameters;
use kmersketch::encodings::Molecule;
use kmersketch::signature::{save_signatures, Signature, Sketchable};
use kmersketch::sketch::minhash::MinHash;
use kmersketch::sketch::Sketch;

fn build_signature() -> Signature {
    let params = ComputeParameters::builder()
        .ksizes(vec![21, 31])
        .num_hashes(50u32)
        .track_abundance(true)
        .build();

    let mut sig = Signature::from_params(&params);
    sig.set_name("test genome");
    sig.set_filename("test.fa");
    sig.add_sequence(
        b"TGCCGCCCAGCACCGGGTGACTAGGTTGAGCCATGATTAACCTGCAATGAGTCCGCCCAGTGATTTACGG",
        false,
    )
    .unwrap();
    sig
}

#[test]
fn roundtrip_json() {
    let sig = build_signature();

    let mut buffer = vec![];
    sig.to_writer(&mut buffer).unwrap();

    let loaded = Signature::from_reader(&buffer[..]).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], sig);
}

#[test]
fn roundtrip_compressed_buffer() {
    let sigs = vec![build_signature(), Signature::default()];

    let mut buffer = vec![];
    save_signatures(&sigs, &mut buffer, Some(niffler::compression::Level::One)).unwrap();

    // gzip magic number
    assert_eq!(&buffer[..2], &[0x1f, 0x8b]);

    let loaded = Signature::from_reader(&buffer[..]).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], sigs[0]);
    assert_eq!(loaded[1], sigs[1]);
}

#[test]
fn envelope_fields() {
    let sig = build_signature();

    let mut buffer = vec![];
    sig.to_writer(&mut buffer).unwrap();

    let value: Value = serde_json::from_slice(&buffer).unwrap();
    let entry = &value[0];

    assert_eq!(entry["class"], "sourmash_signature");
    assert_eq!(entry["email"], "");
    assert_eq!(entry["name"], "test genome");
    assert_eq!(entry["filename"], "test.fa");
    assert_eq!(entry["license"], "CC0");
    assert_eq!(entry["hash_function"], "0.murmur64");
    assert_eq!(entry["version"], 0.4);

    let sketches = entry["signatures"].as_array().unwrap();
    assert_eq!(sketches.len(), 2);

    let first = &sketches[0];
    assert_eq!(first["ksize"], 21);
    assert_eq!(first["seed"], 42);
    assert_eq!(first["max_hash"], 0);
    assert_eq!(first["num"], 50);
    assert!(first["md5sum"].is_string());

    let mins = first["mins"].as_array().unwrap();
    assert!(!mins.is_empty());
    let abunds = first["abundances"].as_array().unwrap();
    assert_eq!(mins.len(), abunds.len());
}

#[test]
fn signature_equality() {
    let a = build_signature();
    let mut b = build_signature();

    assert_eq!(a, b);

    b.set_name("something else");
    assert_ne!(a, b);

    let mut c = build_signature();
    c.add_sequence(b"CCCCCCCCCCCCCCCCCCCCCCCC", false).unwrap();
    assert_ne!(a, c);
}

#[test]
fn load_signatures_filters() {
    let sigs = vec![build_signature()];

    let mut buffer = vec![];
    save_signatures(&sigs, &mut buffer, None).unwrap();

    let all = Signature::load_signatures(&buffer[..], None, None, None).unwrap();
    assert_eq!(all.len(), 2);

    let k21 = Signature::load_signatures(&buffer[..], Some(21), None, None).unwrap();
    assert_eq!(k21.len(), 1);
    assert_eq!(k21[0].minhash().unwrap().ksize(), 21);

    let dna = Signature::load_signatures(&buffer[..], None, Some(Molecule::Dna), None).unwrap();
    assert_eq!(dna.len(), 2);

    let protein =
        Signature::load_signatures(&buffer[..], None, Some(Molecule::Protein), None).unwrap();
    assert!(protein.is_empty());
}

#[test]
fn sketch_from_fasta_records() {
    let fasta = b">read1\nTGCCGCCCAGCACCGGGTGACTAGGTTGAGCCATGATTAACC\n>read2\nGTCCGCCCAGTGATTTACGGTACCAGTCAGGTGCATTGAAGC\n";

    let params = ComputeParameters::builder()
        .ksizes(vec![21])
        .num_hashes(100u32)
        .build();
    let mut sig = Signature::from_params(&params);

    let mut parser = parse_fastx_reader(&fasta[..]).unwrap();
    while let Some(record) = parser.next() {
        let record = record.unwrap();
        sig.add_sequence(&record.seq(), false).unwrap();
    }

    assert_eq!(sig.size(), 1);
    let mh = sig.minhash().unwrap();
    // 22 canonical 21-mers per record
    assert_eq!(mh.size(), 44);
}

#[test]
fn incompatible_sketch_types() {
    use kmersketch::sketch::hyperloglog::HyperLogLog;
    use kmersketch::Error;

    let mh = Sketch::MinHash(MinHash::new(0, 21, Molecule::Dna, 42, false, 10));
    let hll = Sketch::HyperLogLog(HyperLogLog::new(10, 21).unwrap());

    assert!(matches!(
        mh.check_compatible(&hll),
        Err(Error::MismatchSignatureType)
    ));
}
