//! End-to-end tests for the composite barcode pipeline.
//!
//! These tests exercise the full generate, render, read-back, verify loop
//! through real pixels, including tampered symbols, wrong keys, and rasters
//! degraded the way print-and-scan degrades them.

use graymark_core::{
    read_composite, render_standard_qr, Generator, KeyMaterial, MasterKey, SignatureScheme,
    SymbolConfig, Verifier,
};
use image::{GrayImage, Luma};
use p256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

fn symmetric_material(fill: u8) -> KeyMaterial {
    KeyMaterial::Symmetric(MasterKey::from_bytes(&[fill; 32]).expect("32-byte key"))
}

/// Signing material and matching public-only material.
fn asymmetric_pair() -> (KeyMaterial, KeyMaterial) {
    let signing = SigningKey::random(&mut OsRng);
    let verifying = VerifyingKey::from(&signing);
    (
        KeyMaterial::Asymmetric {
            signing: Some(signing),
            verifying: verifying.clone(),
        },
        KeyMaterial::Asymmetric {
            signing: None,
            verifying,
        },
    )
}

fn pipeline(material: KeyMaterial, config: SymbolConfig) -> (Generator, Verifier) {
    (
        Generator::new(SignatureScheme::new(material.clone()), config),
        Verifier::new(SignatureScheme::new(material), config),
    )
}

/// Add deterministic per-pixel noise in `[-amplitude, amplitude]`.
fn jitter_image(img: &GrayImage, amplitude: i16) -> GrayImage {
    let span = 2 * amplitude as u32 + 1;
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let noise = ((x * 7 + y * 13) % span) as i16 - amplitude;
        let v = img.get_pixel(x, y).0[0] as i16 + noise;
        Luma([v.clamp(0, 255) as u8])
    })
}

/// Replace exact palette levels, simulating print-and-scan tone drift.
fn remap_palette(img: &GrayImage, map: &[(u8, u8); 4]) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let v = img.get_pixel(x, y).0[0];
        let mapped = map
            .iter()
            .find(|(from, _)| *from == v)
            .map(|(_, to)| *to)
            .unwrap_or(v);
        Luma([mapped])
    })
}

// ============================================================================
// Roundtrip Tests
// ============================================================================

#[test]
fn test_hmac_roundtrip_via_pixels() {
    let (generator, verifier) = pipeline(symmetric_material(1), SymbolConfig::default());
    let generated = generator
        .create_barcode("Product-123", "MySecret")
        .expect("Failed to create barcode");
    let img = generator.render(&generated).expect("Failed to render");

    let (recovered, _) =
        read_composite(&img, &SymbolConfig::default()).expect("Failed to read composite");
    assert_eq!(recovered, generated.barcode);
    assert!(verifier.verify(&recovered).expect("Verification errored"));
    assert_eq!(recovered.secret().as_deref(), Some("MySecret"));
}

#[test]
fn test_ecdsa_roundtrip_with_public_only_verifier() {
    let (signing_material, public_material) = asymmetric_pair();
    let config = SymbolConfig::default();
    let generator = Generator::new(SignatureScheme::new(signing_material), config);
    let verifier = Verifier::new(SignatureScheme::new(public_material), config);

    let generated = generator
        .create_barcode("Product-123", "MySecret")
        .expect("Failed to create barcode");
    assert_eq!(generated.barcode.signature().len(), 64);

    let img = generator.render(&generated).expect("Failed to render");
    let (recovered, _) = read_composite(&img, &config).expect("Failed to read composite");
    assert!(verifier.verify(&recovered).expect("Verification errored"));
}

#[test]
fn test_roundtrip_with_long_identifier() {
    let (generator, verifier) = pipeline(symmetric_material(2), SymbolConfig::default());
    let identifier = "serial-".to_string() + &"0123456789".repeat(12);
    let generated = generator
        .create_barcode(&identifier, "")
        .expect("Failed to create barcode");
    let img = generator.render(&generated).expect("Failed to render");

    let (recovered, _) =
        read_composite(&img, &SymbolConfig::default()).expect("Failed to read composite");
    assert_eq!(recovered.identifier().as_deref(), Some(identifier.as_str()));
    assert!(verifier.verify(&recovered).expect("Verification errored"));
}

#[test]
fn test_signature_layer_drives_version_for_small_payloads() {
    let (signing_material, _) = asymmetric_pair();
    let config = SymbolConfig::default();
    let generator = Generator::new(SignatureScheme::new(signing_material), config);

    let generated = generator
        .create_barcode("Item-1", "")
        .expect("Failed to create barcode");

    // The unpadded payload alone fits a smaller symbol; the 64-byte
    // signature's base64 is what forced the shared version up.
    let unpadded = generated.barcode.public_data().trim_end();
    let data_only = graymark_core::matrix::required_version(unpadded, &config)
        .expect("Failed to derive version");
    assert!(
        data_only < generated.version,
        "expected data-only version {} below shared version {}",
        data_only,
        generated.version
    );
}

#[test]
fn test_roundtrip_with_custom_scale() {
    let config = SymbolConfig::default().with_scale(6);
    let (generator, verifier) = pipeline(symmetric_material(3), config);
    let generated = generator
        .create_barcode("Product-123", "s")
        .expect("Failed to create barcode");
    let img = generator.render(&generated).expect("Failed to render");

    let (recovered, _) = read_composite(&img, &config).expect("Failed to read composite");
    assert!(verifier.verify(&recovered).expect("Verification errored"));
}

// ============================================================================
// Tampering Tests
// ============================================================================

#[test]
fn test_tampered_identifier_fails_verification() {
    let (generator, verifier) = pipeline(symmetric_material(4), SymbolConfig::default());
    let generated = generator
        .create_barcode("Product-123", "MySecret")
        .expect("Failed to create barcode");

    let tampered = generated
        .barcode
        .public_data()
        .replacen("Product-123", "Product-124", 1);
    let forged = generated.barcode.with_public_data(tampered);
    assert!(
        !verifier.verify(&forged).expect("Verification errored"),
        "altered payload must not verify"
    );
}

#[test]
fn test_extra_padding_fails_verification() {
    let (generator, verifier) = pipeline(symmetric_material(5), SymbolConfig::default());
    let generated = generator
        .create_barcode("Product-123", "")
        .expect("Failed to create barcode");

    // One extra space re-encodes to a different matrix, so the visual
    // binding breaks even though the parsed payload is unchanged.
    let padded = format!("{} ", generated.barcode.public_data());
    let forged = generated.barcode.with_public_data(padded);
    assert!(!verifier.verify(&forged).expect("Verification errored"));
}

#[test]
fn test_signature_transplant_fails_verification() {
    let (signing_material, public_material) = asymmetric_pair();
    let config = SymbolConfig::default();
    let generator = Generator::new(SignatureScheme::new(signing_material), config);
    let verifier = Verifier::new(SignatureScheme::new(public_material), config);

    let a = generator
        .create_barcode("Product-A", "")
        .expect("Failed to create barcode A");
    let b = generator
        .create_barcode("Product-B", "")
        .expect("Failed to create barcode B");

    let forged = a.barcode.with_signature(b.barcode.signature().to_vec());
    assert!(!verifier.verify(&forged).expect("Verification errored"));
}

#[test]
fn test_bit_flipped_signature_fails_verification() {
    let (generator, verifier) = pipeline(symmetric_material(6), SymbolConfig::default());
    let generated = generator
        .create_barcode("Product-123", "")
        .expect("Failed to create barcode");

    let mut signature = generated.barcode.signature().to_vec();
    signature[0] ^= 0x01;
    let forged = generated.barcode.with_signature(signature);
    assert!(!verifier.verify(&forged).expect("Verification errored"));
}

#[test]
fn test_mismatched_mask_configuration_fails_verification() {
    let generate_config = SymbolConfig::default();
    let verify_config = SymbolConfig {
        mask: 1,
        ..SymbolConfig::default()
    };
    let material = symmetric_material(7);
    let generator = Generator::new(SignatureScheme::new(material.clone()), generate_config);
    let verifier = Verifier::new(SignatureScheme::new(material), verify_config);

    let generated = generator
        .create_barcode("Product-123", "")
        .expect("Failed to create barcode");

    // Same text and signature, but the verifier re-encodes with another
    // mask, so the fingerprinted matrix no longer matches.
    assert!(!verifier
        .verify(&generated.barcode)
        .expect("Verification errored"));
}

// ============================================================================
// Wrong Key Tests
// ============================================================================

#[test]
fn test_wrong_master_key_fails_verification() {
    let config = SymbolConfig::default();
    let generator = Generator::new(SignatureScheme::new(symmetric_material(8)), config);
    let verifier = Verifier::new(SignatureScheme::new(symmetric_material(9)), config);

    let generated = generator
        .create_barcode("Product-123", "")
        .expect("Failed to create barcode");
    assert!(!verifier
        .verify(&generated.barcode)
        .expect("Verification errored"));
}

#[test]
fn test_wrong_public_key_fails_verification() {
    let (signing_material, _) = asymmetric_pair();
    let (_, unrelated_public) = asymmetric_pair();
    let config = SymbolConfig::default();
    let generator = Generator::new(SignatureScheme::new(signing_material), config);
    let verifier = Verifier::new(SignatureScheme::new(unrelated_public), config);

    let generated = generator
        .create_barcode("Product-123", "")
        .expect("Failed to create barcode");
    assert!(!verifier
        .verify(&generated.barcode)
        .expect("Verification errored"));
}

// ============================================================================
// Degraded Raster Tests
// ============================================================================

#[test]
fn test_roundtrip_survives_pixel_jitter() {
    let (generator, verifier) = pipeline(symmetric_material(10), SymbolConfig::default());
    let generated = generator
        .create_barcode("Product-123", "MySecret")
        .expect("Failed to create barcode");
    let img = generator.render(&generated).expect("Failed to render");

    let noisy = jitter_image(&img, 8);
    let (recovered, _) =
        read_composite(&noisy, &SymbolConfig::default()).expect("Failed to read noisy composite");
    assert_eq!(recovered, generated.barcode);
    assert!(verifier.verify(&recovered).expect("Verification errored"));
}

#[test]
fn test_roundtrip_survives_palette_drift() {
    let (generator, verifier) = pipeline(symmetric_material(11), SymbolConfig::default());
    let generated = generator
        .create_barcode("Product-123", "MySecret")
        .expect("Failed to create barcode");
    let img = generator.render(&generated).expect("Failed to render");

    // Printed and rescanned symbols rarely keep the exact palette.
    let drifted = remap_palette(&img, &[(0, 12), (90, 97), (166, 171), (255, 243)]);
    let (recovered, _) =
        read_composite(&drifted, &SymbolConfig::default()).expect("Failed to read drifted composite");
    assert!(verifier.verify(&recovered).expect("Verification errored"));
}

#[test]
fn test_roundtrip_survives_drift_and_jitter() {
    let (generator, verifier) = pipeline(symmetric_material(12), SymbolConfig::default());
    let generated = generator
        .create_barcode("Product-123", "")
        .expect("Failed to create barcode");
    let img = generator.render(&generated).expect("Failed to render");

    let degraded = jitter_image(
        &remap_palette(&img, &[(0, 10), (90, 95), (166, 170), (255, 245)]),
        5,
    );
    let (recovered, _) =
        read_composite(&degraded, &SymbolConfig::default()).expect("Failed to read degraded composite");
    assert!(verifier.verify(&recovered).expect("Verification errored"));
}

// ============================================================================
// Reader Edge Cases
// ============================================================================

#[test]
fn test_monochrome_image_is_not_a_composite() {
    let img = GrayImage::from_pixel(300, 300, Luma([128u8]));
    assert!(read_composite(&img, &SymbolConfig::default()).is_none());
}

#[test]
fn test_plain_qr_does_not_read_as_composite() {
    let config = SymbolConfig::default();
    let img = render_standard_qr("hello world", &config).expect("Failed to render QR");
    assert!(read_composite(&img, &config).is_none());
}

#[test]
fn test_tiny_image_is_not_a_composite() {
    let img = GrayImage::from_pixel(15, 15, Luma([0u8]));
    assert!(read_composite(&img, &SymbolConfig::default()).is_none());
}
