/// Genesis pipeline regression tests
/// Pins did:key, signature, DID and CID for fixed keys so any change to the
/// canonical encoding or the signing path shows up here.
use plc_genesis::{
    crypto::{decode_signature, signer, Curve, PlcSigner, RotationKey, RotationPublicKey},
    operation::{codec, create_genesis, derive_did, verify_genesis, GenesisBuilder},
    PlcError, SignedOperation,
};

const FIXED_SECRET: [u8; 32] = [0x2a; 32];

struct Vector {
    curve: Curve,
    did_key: &'static str,
    sig: &'static str,
    did: &'static str,
    cid: &'static str,
}

const VECTORS: [Vector; 2] = [
    Vector {
        curve: Curve::K256,
        did_key: "did:key:zQ3shkpqZaRR4P8KsTE1vXHRtjAAjKPfHFeu5B8vmPnW79A51",
        sig: "SKRGdNY-SL3-vuDA85Nc2jcqkUozTv3Y-HdgS9n0XzpqQ7ZjSBDBueU974Cr6ppv6zjJS0ZFBmw4k8HbEiRloA",
        did: "did:plc:ks6o6eyhckcj6qlyqr4bhmk7",
        cid: "bafyreicuxtxrgbysqspuc6eepaj3cx63674e2dft7jdfxlpaljyje6rcwa",
    },
    Vector {
        curve: Curve::P256,
        did_key: "did:key:zDnaeRH1PoZ4PSSawThYR9z1ZFsDxRj2VdN93ACtMg3ck3Dxn",
        sig: "L5x4Xi_FyT3Eo7Xmeg0GM_JWx-llN9mV5UyONmddVVMfeWUDpmGytLpL1kxrpGKLQ7KzVwDNxo9gd7nkRUE5eA",
        did: "did:plc:qkm5fpl7bobda7arnjezeb3q",
        cid: "bafyreiecthjl27ylqiyhyelkjgjao4fehytd4vik5bzgkvkwgupypsbuba",
    },
];

fn fixed_signer(curve: Curve) -> PlcSigner {
    PlcSigner::new(RotationKey::from_bytes(curve, &FIXED_SECRET).unwrap())
}

#[test]
fn test_fixed_vectors() {
    for vector in &VECTORS {
        let plc_signer = fixed_signer(vector.curve);
        assert_eq!(plc_signer.did_key(), vector.did_key);

        let genesis = create_genesis(
            &plc_signer,
            vec!["at://alice.example".to_string()],
            Some("https://pds.example.com".to_string()),
        )
        .unwrap();

        assert_eq!(genesis.signed.sig, vector.sig, "sig for {}", vector.curve);
        assert_eq!(genesis.did, vector.did, "did for {}", vector.curve);
        assert_eq!(genesis.cid, vector.cid, "cid for {}", vector.curve);
    }
}

#[test]
fn test_fixed_vector_without_pds() {
    let genesis = create_genesis(
        &fixed_signer(Curve::K256),
        vec![
            "at://alice.example".to_string(),
            "at://alice.example.com".to_string(),
        ],
        None,
    )
    .unwrap();

    assert!(genesis.unsigned().services.is_empty());
    assert_eq!(
        genesis.signed.sig,
        "vEae65nfe1g0Gjfy0Pj9R5GfBo0irqKzBBCX54qIkEAbXmJJasfEV3qdafMRC18pxO6sw_kuIMuIDtnSvUl4VA"
    );
    assert_eq!(genesis.did, "did:plc:7d4dr2evr7ldswinxg6kaj6f");
}

#[test]
fn test_unsigned_bytes_layout() {
    let genesis = create_genesis(
        &fixed_signer(Curve::K256),
        vec!["at://alice.example".to_string()],
        Some("https://pds.example.com".to_string()),
    )
    .unwrap();

    // map(6): prev, type, services, alsoKnownAs, rotationKeys, verificationMethods
    let bytes = &genesis.unsigned_bytes;
    assert_eq!(bytes[0], 0xa6);
    assert_eq!(&bytes[1..6], b"\x64prev");
    assert_eq!(bytes[6], 0xf6);
    assert_eq!(&bytes[7..12], b"\x64type");
    assert_eq!(*bytes.last().unwrap(), 0xa0);

    let services_at = bytes
        .windows(9)
        .position(|w| w == b"\x68services")
        .unwrap();
    let aka_at = bytes
        .windows(12)
        .position(|w| w == b"\x6balsoKnownAs")
        .unwrap();
    let rotation_at = bytes
        .windows(13)
        .position(|w| w == b"\x6crotationKeys")
        .unwrap();
    assert!(services_at < aka_at && aka_at < rotation_at);
}

#[test]
fn test_signed_json_round_trip_keeps_did() {
    let genesis = create_genesis(
        &fixed_signer(Curve::P256),
        vec!["at://alice.example".to_string()],
        None,
    )
    .unwrap();

    let json = serde_json::to_string_pretty(&genesis.signed).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();

    assert_eq!(derive_did(&parsed).unwrap(), genesis.did);
    assert!(verify_genesis(&parsed).is_ok());
}

#[test]
fn test_received_document_must_match_its_bytes() {
    let genesis = create_genesis(
        &fixed_signer(Curve::K256),
        vec!["at://alice.example".to_string()],
        Some("https://pds.example.com".to_string()),
    )
    .unwrap();
    let json = serde_json::to_value(&genesis.signed).unwrap();

    // a document without `prev` is not a genesis operation
    let mut without_prev = json.clone();
    without_prev.as_object_mut().unwrap().remove("prev");
    assert!(serde_json::from_value::<SignedOperation>(without_prev).is_err());

    // extra fields would be dropped and change the derived DID
    let mut with_extra = json.clone();
    with_extra["did"] = serde_json::json!("did:plc:abcdefghijklmnopqrstuvwx");
    assert!(serde_json::from_value::<SignedOperation>(with_extra).is_err());

    let parsed: SignedOperation = serde_json::from_value(json).unwrap();
    assert!(verify_genesis(&parsed).is_ok());
    assert_eq!(derive_did(&parsed).unwrap(), genesis.did);
}

#[test]
fn test_builder_and_json_agree() {
    let did_key = fixed_signer(Curve::K256).did_key();
    let built = GenesisBuilder::new()
        .rotation_key(did_key.clone())
        .also_known_as("at://alice.example")
        .pds_endpoint("https://pds.example.com")
        .build();

    let from_json: plc_genesis::UnsignedOperation = serde_json::from_value(serde_json::json!({
        "verificationMethods": {},
        "services": {
            "atproto_pds": {
                "endpoint": "https://pds.example.com",
                "type": "AtprotoPersonalDataServer"
            }
        },
        "alsoKnownAs": ["at://alice.example"],
        "rotationKeys": [did_key],
        "prev": null,
        "type": "plc_operation"
    }))
    .unwrap();

    assert_eq!(
        codec::serialize(&built).unwrap(),
        codec::serialize(&from_json).unwrap()
    );
}

#[test]
fn test_fresh_keys_verify_end_to_end() {
    for curve in Curve::ALL {
        let key = RotationKey::generate(curve);
        let genesis = create_genesis(
            &PlcSigner::new(key.clone()),
            vec!["at://bob.example".to_string()],
            Some("https://pds.example.com".to_string()),
        )
        .unwrap();

        assert!(verify_genesis(&genesis.signed).is_ok());

        let raw = decode_signature(&genesis.signed.sig).unwrap();
        assert!(signer::is_low_s(curve, &raw));

        let public_key = RotationPublicKey::from_did_key(&genesis.unsigned().rotation_keys[0]).unwrap();
        assert_eq!(public_key.curve(), curve);
        assert!(signer::verify(&public_key, &genesis.unsigned_bytes, &raw).is_ok());
    }
}

#[test]
fn test_cross_curve_signature_rejected() {
    let genesis = create_genesis(&fixed_signer(Curve::K256), vec![], None).unwrap();
    let raw = decode_signature(&genesis.signed.sig).unwrap();

    let p256_key = fixed_signer(Curve::P256).key().public_key();
    assert!(matches!(
        signer::verify(&p256_key, &genesis.unsigned_bytes, &raw),
        Err(PlcError::InvalidSignature(_))
    ));
}
