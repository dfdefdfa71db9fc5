use std::slice;

use crate::cmd::ComputeParameters;
use crate::ffi::signature::KmersketchComputeParameters;
use crate::ffi::utils::ForeignObject;

#[no_mangle]
pub unsafe extern "C" fn computeparams_new() -> *mut KmersketchComputeParameters {
    KmersketchComputeParameters::from_rust(ComputeParameters::default())
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_free(ptr: *mut KmersketchComputeParameters) {
    KmersketchComputeParameters::drop(ptr);
}

ffi_fn! {
unsafe fn computeparams_ksizes(ptr: *const KmersketchComputeParameters, size: *mut usize) -> Result<*const u32> {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    let output = cp.ksizes().clone();
    *size = output.len();

    Ok(Box::into_raw(output.into_boxed_slice()) as *const u32)
}
}

ffi_fn! {
unsafe fn computeparams_set_ksizes(
    ptr: *mut KmersketchComputeParameters,
    ksizes_ptr: *const u32,
    insize: usize,
  ) -> Result<()> {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    let ksizes = {
        assert!(!ksizes_ptr.is_null());
        slice::from_raw_parts(ksizes_ptr, insize)
    };

    cp.set_ksizes(ksizes.into());

    Ok(())
}
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_ksizes_free(ptr: *mut u32, insize: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Vec::from_raw_parts(ptr, insize, insize));
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_seed(ptr: *const KmersketchComputeParameters) -> u64 {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.seed()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_seed(
    ptr: *mut KmersketchComputeParameters,
    new_seed: u64,
) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_seed(new_seed);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_dna(ptr: *const KmersketchComputeParameters) -> bool {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.dna()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_dna(ptr: *mut KmersketchComputeParameters, v: bool) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_dna(v);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_protein(ptr: *const KmersketchComputeParameters) -> bool {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.protein()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_protein(
    ptr: *mut KmersketchComputeParameters,
    v: bool,
) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_protein(v);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_dayhoff(ptr: *const KmersketchComputeParameters) -> bool {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.dayhoff()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_dayhoff(
    ptr: *mut KmersketchComputeParameters,
    v: bool,
) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_dayhoff(v);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_hp(ptr: *const KmersketchComputeParameters) -> bool {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.hp()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_hp(ptr: *mut KmersketchComputeParameters, v: bool) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_hp(v);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_scaled(ptr: *const KmersketchComputeParameters) -> u64 {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.scaled()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_scaled(
    ptr: *mut KmersketchComputeParameters,
    scaled: u64,
) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_scaled(scaled);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_num_hashes(ptr: *const KmersketchComputeParameters) -> u32 {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.num_hashes()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_num_hashes(
    ptr: *mut KmersketchComputeParameters,
    num: u32,
) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_num_hashes(num);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_track_abundance(
    ptr: *const KmersketchComputeParameters,
) -> bool {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.track_abundance()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_track_abundance(
    ptr: *mut KmersketchComputeParameters,
    v: bool,
) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_track_abundance(v);
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_input_is_protein(
    ptr: *const KmersketchComputeParameters,
) -> bool {
    let cp = KmersketchComputeParameters::as_rust(ptr);
    cp.input_is_protein()
}

#[no_mangle]
pub unsafe extern "C" fn computeparams_set_input_is_protein(
    ptr: *mut KmersketchComputeParameters,
    v: bool,
) {
    let cp = KmersketchComputeParameters::as_rust_mut(ptr);
    cp.set_input_is_protein(v);
}
