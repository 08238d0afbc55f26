use phf::{Map, phf_map};

/// Standard atomic masses in unified atomic mass units, keyed by IUPAC symbol.
///
/// Covers the elements that show up in organic and organometallic fragment
/// libraries; exotic symbols simply miss and leave the particle massless.
pub static STANDARD_ATOMIC_MASSES: Map<&'static str, f64> = phf_map! {
    "H" => 1.008,
    "He" => 4.0026,
    "Li" => 6.94,
    "B" => 10.81,
    "C" => 12.011,
    "N" => 14.007,
    "O" => 15.999,
    "F" => 18.998,
    "Na" => 22.990,
    "Mg" => 24.305,
    "Al" => 26.982,
    "Si" => 28.085,
    "P" => 30.974,
    "S" => 32.06,
    "Cl" => 35.45,
    "Ar" => 39.948,
    "K" => 39.098,
    "Ca" => 40.078,
    "Fe" => 55.845,
    "Ni" => 58.693,
    "Cu" => 63.546,
    "Zn" => 65.38,
    "Br" => 79.904,
    "I" => 126.90,
};

/// Looks up the standard atomic mass for an element symbol.
///
/// Symbols are matched case-sensitively in their conventional capitalization
/// (e.g. `"Cl"`, not `"CL"`).
pub fn standard_mass(symbol: &str) -> Option<f64> {
    STANDARD_ATOMIC_MASSES.get(symbol).copied()
}
