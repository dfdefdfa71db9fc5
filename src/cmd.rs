//! Parameter sets for building signatures.
//!
//! [`ComputeParameters`] bundles every knob used when sketching a
//! dataset. Some options are combinational (each k-size and molecule
//! type selected produces its own sketch), while others apply to every
//! generated sketch (`scaled`, `num_hashes`, `seed`, `track_abundance`).

use getset::{CopyGetters, Getters, Setters};
use typed_builder::TypedBuilder;

use crate::encodings::Molecule;
use crate::signature::Signature;
use crate::sketch::minhash::{max_hash_for_scaled, MinHash};
use crate::sketch::Sketch;

impl Signature {
    /// Build a new [`Signature`] with one empty sketch per combination
    /// selected in `params`.
    pub fn from_params(params: &ComputeParameters) -> Signature {
        let template = build_template(params);

        Signature::builder()
            .hash_function("0.murmur64")
            .name(params.merge().clone())
            .filename(None)
            .signatures(template)
            .build()
    }
}

#[derive(TypedBuilder, CopyGetters, Getters, Setters)]
pub struct ComputeParameters {
    /// List of k-mer sizes to sketch at.
    #[getset(get = "pub", set = "pub")]
    #[builder(default = vec![21, 31, 51])]
    ksizes: Vec<u32>,

    /// Build nucleotide sketches.
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = true)]
    dna: bool,

    /// Build translated protein sketches.
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = false)]
    protein: bool,

    /// Build Dayhoff-encoded sketches.
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = false)]
    dayhoff: bool,

    /// Build hydrophobic-polar-encoded sketches.
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = false)]
    hp: bool,

    /// Keep 1 in `scaled` of the input k-mers (0 disables the
    /// threshold).
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = 0u64)]
    scaled: u64,

    /// Number of hashes to keep in each sketch (0 disables the cap).
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = 500u32)]
    num_hashes: u32,

    /// Seed used by MurmurHash.
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = 42u64)]
    seed: u64,

    /// Input sequences are amino acids, no translation needed.
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = false)]
    input_is_protein: bool,

    /// Track k-mer abundances in the generated sketches.
    #[getset(get_copy = "pub", set = "pub")]
    #[builder(default = false)]
    track_abundance: bool,

    /// Name for the merged signature.
    #[getset(get = "pub", set = "pub")]
    #[builder(default = None)]
    merge: Option<String>,

    /// Signature license. Currently only CC0 is supported.
    #[getset(get = "pub", set = "pub")]
    #[builder(default = "CC0".into())]
    license: String,
}

impl Default for ComputeParameters {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Build a collection of empty sketches covering every k-size and
/// molecule type selected in `params`.
pub fn build_template(params: &ComputeParameters) -> Vec<Sketch> {
    let max_hash = max_hash_for_scaled(params.scaled);

    params
        .ksizes
        .iter()
        .flat_map(|k| {
            let mut ksigs = vec![];

            for (selected, molecule) in [
                (params.protein, Molecule::Protein),
                (params.dayhoff, Molecule::Dayhoff),
                (params.hp, Molecule::Hp),
                (params.dna, Molecule::Dna),
            ] {
                if selected {
                    ksigs.push(Sketch::MinHash(
                        MinHash::builder()
                            .num(params.num_hashes)
                            .ksize(*k)
                            .molecule(molecule)
                            .max_hash(max_hash)
                            .seed(params.seed)
                            .abunds(if params.track_abundance {
                                Some(vec![])
                            } else {
                                None
                            })
                            .build(),
                    ));
                }
            }

            ksigs
        })
        .collect()
}
