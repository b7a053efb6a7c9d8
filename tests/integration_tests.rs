//! Integration tests for iso8583-engine
//!
//! These tests verify end-to-end functionality: field access, wire encoding
//! and decoding against the POS terminal layout and custom schemas.

use iso8583_engine::*;

fn pos_engine() -> Engine {
    Engine::with_schema(presets::pos_64_schema().unwrap())
}

fn sample_request(engine: &Engine) -> MessageRecord {
    let mut record = MessageRecord::new();
    engine.clear_all_fields(&mut record).unwrap();

    engine.set_field(&mut record, 0, b"0800").unwrap();
    engine.set_field(&mut record, 4, b"000000000293").unwrap();
    engine.set_field(&mut record, 11, b"000137").unwrap();
    engine.set_field(&mut record, 41, b"12345678").unwrap();
    engine.set_field(&mut record, 42, b"998877665508642").unwrap();
    engine.set_field(&mut record, 60, b"00190812003").unwrap();
    engine.set_field(&mut record, 63, b"001").unwrap();
    record
}

#[test]
fn test_sample_request_wire_layout() {
    let engine = pos_engine();
    let record = sample_request(&engine);

    let mut wire = [0u8; 1024];
    let size = engine.encode_wire(&record, &mut wire).unwrap();

    let mut expected = vec![
        0x08, 0x00, // MTI
        0x10, 0x20, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x12, // bitmap: 4, 11, 41, 42, 60, 63
        0x00, 0x00, 0x00, 0x00, 0x02, 0x93, // 4
        0x00, 0x01, 0x37, // 11
    ];
    expected.extend_from_slice(b"12345678"); // 41
    expected.extend_from_slice(b"998877665508642"); // 42
    expected.extend_from_slice(&[0x00, 0x11, 0x00, 0x19, 0x08, 0x12, 0x00, 0x30]); // 60
    expected.extend_from_slice(&[0x00, 0x03]); // 63
    expected.extend_from_slice(b"001");

    assert_eq!(&wire[..size], expected.as_slice());
}

#[test]
fn test_sample_request_roundtrip() {
    let engine = pos_engine();
    let record = sample_request(&engine);

    let mut wire = [0u8; 1024];
    let size = engine.encode_wire(&record, &mut wire).unwrap();

    let mut decoded = MessageRecord::new();
    assert_eq!(engine.decode_wire(&wire[..size], &mut decoded), Ok(size));

    assert_eq!(decoded.mti(), b"0800");
    let fields: Vec<usize> = decoded.present_fields().collect();
    assert_eq!(fields, vec![4, 11, 41, 42, 60, 63]);

    for field_no in fields {
        assert_eq!(
            engine.read_field(&decoded, field_no).unwrap(),
            engine.read_field(&record, field_no).unwrap(),
            "field {field_no}"
        );
    }

    // Decoding packs fields densely, so the buffer matches the encoded record
    assert_eq!(decoded.packed(), record.packed());

    // Re-encoding reproduces the same bytes
    let mut again = [0u8; 1024];
    let size2 = engine.encode_wire(&decoded, &mut again).unwrap();
    assert_eq!(&again[..size2], &wire[..size]);
}

#[test]
fn test_pan_field_on_the_wire() {
    let engine = pos_engine();
    let mut record = MessageRecord::new();
    engine.set_field(&mut record, 0, b"0200").unwrap();
    engine.set_field(&mut record, 2, b"6225881234").unwrap();

    let mut wire = [0u8; 64];
    let size = engine.encode_wire(&record, &mut wire).unwrap();
    assert_eq!(
        &wire[10..size],
        &[0x11, 0x62, 0x25, 0x88, 0x12, 0x34, 0xF0]
    );

    let mut decoded = MessageRecord::new();
    engine.decode_wire(&wire[..size], &mut decoded).unwrap();
    assert_eq!(engine.read_field(&decoded, 2).unwrap(), b"6225881234F");
}

#[test]
fn test_variable_bcd_without_filler() {
    let schema = presets::pos_64_schema()
        .unwrap()
        .with_pan_field(None)
        .unwrap();
    let engine = Engine::with_schema(schema);
    let mut record = MessageRecord::new();
    engine.set_field(&mut record, 0, b"0200").unwrap();
    engine.set_field(&mut record, 2, b"6225881234").unwrap();

    let mut wire = [0u8; 64];
    let size = engine.encode_wire(&record, &mut wire).unwrap();
    assert_eq!(&wire[10..size], &[0x10, 0x62, 0x25, 0x88, 0x12, 0x34]);
}

#[test]
fn test_all_field_kinds_roundtrip() {
    let engine = pos_engine();
    let mut record = MessageRecord::new();

    let mut merchant_name = b"ACME STORE".to_vec();
    merchant_name.resize(40, b' ');

    let values: Vec<(usize, &[u8], Vec<u8>)> = vec![
        (2, b"4761739001010119", b"4761739001010119F".to_vec()),
        (3, b"000000", b"000000".to_vec()),
        (14, b"2512", b"2512".to_vec()),
        (22, b"051", b"051".to_vec()),
        (
            35,
            b"4761739001010119D22122011143804400000",
            b"4761739001010119D22122011143804400000".to_vec(),
        ),
        (39, b"00", b"00".to_vec()),
        (43, b"ACME STORE", merchant_name),
        (
            45,
            b"B4761739001010119^TEST/CARD^2212",
            b"B4761739001010119^TEST/CARD^2212".to_vec(),
        ),
        (
            52,
            b"\x01\x23\x45\x67\x89\xAB\xCD\xEF",
            vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF],
        ),
        (55, b"\x9F\x26\x08ARQC", b"\x9F\x26\x08ARQC".to_vec()),
        (64, b"\xFF\x00", vec![0xFF, 0, 0, 0, 0, 0, 0, 0]),
    ];

    engine.set_field(&mut record, 0, b"0100").unwrap();
    for (field_no, value, _) in &values {
        engine.set_field(&mut record, *field_no, value).unwrap();
    }

    let mut wire = [0u8; 1024];
    let size = engine.encode_wire(&record, &mut wire).unwrap();

    let mut decoded = MessageRecord::new();
    engine.decode_wire(&wire[..size], &mut decoded).unwrap();

    assert_eq!(decoded.mti(), b"0100");
    for (field_no, _, expected) in &values {
        assert_eq!(
            &engine.read_field(&decoded, *field_no).unwrap(),
            expected,
            "field {field_no}"
        );
    }
}

#[test]
fn test_cleared_field_not_encoded() {
    let engine = pos_engine();
    let mut record = sample_request(&engine);
    engine.clear_one_field(&mut record, 42).unwrap();

    let mut wire = [0u8; 1024];
    let size = engine.encode_wire(&record, &mut wire).unwrap();

    let mut decoded = MessageRecord::new();
    engine.decode_wire(&wire[..size], &mut decoded).unwrap();
    assert!(!decoded.is_present(42));
    assert!(decoded.is_present(41));
    assert!(decoded.offset() < record.offset());
}

#[test]
fn test_reset_field_after_clear_uses_new_region() {
    let engine = pos_engine();
    let mut record = sample_request(&engine);
    let before = record.offset();

    engine.clear_one_field(&mut record, 41).unwrap();
    engine.set_field(&mut record, 41, b"87654321").unwrap();

    assert_eq!(record.slot(41).unwrap().offset as usize, before);
    assert_eq!(record.offset(), before + 8);
    assert_eq!(engine.read_field(&record, 41).unwrap(), b"87654321");
}

#[test]
fn test_extended_bitmap_roundtrip() {
    let mut table = vec![FieldFormat::ascii(4); 128];
    table[..64].copy_from_slice(&presets::POS_64);
    table[69] = FieldFormat::bcd(3);
    table[89] = FieldFormat::digits(42);
    table[127] = FieldFormat::binary(64);

    let mut engine = Engine::new();
    engine.configure(BitmapMode::Extended, &table).unwrap();

    let mut record = MessageRecord::new();
    engine.set_field(&mut record, 0, b"0420").unwrap();
    engine.set_field(&mut record, 4, b"000000010000").unwrap();
    engine.set_field(&mut record, 70, b"301").unwrap();
    engine.set_field(&mut record, 90, b"0200000137").unwrap();
    engine.set_field(&mut record, 128, b"MACMACMA").unwrap();

    let mut wire = [0u8; 256];
    let size = engine.encode_wire(&record, &mut wire).unwrap();
    assert_eq!(wire[2] & 0x80, 0x80);

    let (bitmap, used) = Bitmap::decode(&wire[2..size], BitmapMode::Extended).unwrap();
    assert_eq!(used, 16);
    let set: Vec<usize> = bitmap.iter_set().collect();
    assert_eq!(set, vec![1, 4, 70, 90, 128]);

    let mut decoded = MessageRecord::new();
    assert_eq!(engine.decode_wire(&wire[..size], &mut decoded), Ok(size));
    assert_eq!(engine.read_field(&decoded, 70).unwrap(), b"301");
    let mut account = vec![b'0'; 32];
    account.extend_from_slice(b"0200000137");
    assert_eq!(engine.read_field(&decoded, 90).unwrap(), account);
    assert_eq!(engine.read_field(&decoded, 128).unwrap(), b"MACMACMA");
}

#[test]
fn test_primary_engine_reads_primary_part_of_extended_message() {
    let mut table = vec![FieldFormat::ascii(4); 128];
    table[..64].copy_from_slice(&presets::POS_64);
    let extended = Engine::with_schema(Schema::new(BitmapMode::Extended, &table).unwrap());
    let primary = pos_engine();

    let mut record = MessageRecord::new();
    extended.set_field(&mut record, 0, b"0800").unwrap();
    extended.set_field(&mut record, 11, b"000001").unwrap();

    let mut wire = [0u8; 64];
    let size = extended.encode_wire(&record, &mut wire).unwrap();

    // A 64-field engine reads only the primary bitmap, so the first three
    // bytes of the secondary bitmap come back as field 11.
    let mut decoded = MessageRecord::new();
    let consumed = primary.decode_wire(&wire[..size], &mut decoded).unwrap();
    assert_eq!(consumed, 2 + 8 + 3);
    assert!(decoded.is_present(11));
}

#[test]
fn test_multiple_engines_side_by_side() {
    let pos = pos_engine();
    let ascii_only = Engine::with_schema(
        Schema::new(BitmapMode::Primary, &[FieldFormat::var_ascii(99); 64]).unwrap(),
    );

    let mut a = MessageRecord::new();
    let mut b = MessageRecord::new();
    pos.set_field(&mut a, 0, b"0800").unwrap();
    ascii_only.set_field(&mut b, 0, b"0800").unwrap();
    pos.set_field(&mut a, 11, b"000137").unwrap();
    ascii_only.set_field(&mut b, 11, b"000137").unwrap();

    let mut wire_a = [0u8; 64];
    let mut wire_b = [0u8; 64];
    let size_a = pos.encode_wire(&a, &mut wire_a).unwrap();
    let size_b = ascii_only.encode_wire(&b, &mut wire_b).unwrap();

    assert_eq!(size_a, 2 + 8 + 3);
    assert_eq!(size_b, 2 + 8 + 1 + 6);
    assert_eq!(&wire_b[10..size_b], b"\x06000137");
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = pos_engine();

    std::thread::scope(|scope| {
        for i in 0..4u32 {
            let engine = &engine;
            scope.spawn(move || {
                let mut record = MessageRecord::new();
                let stan = format!("{:06}", i + 1);
                engine.set_field(&mut record, 0, b"0800").unwrap();
                engine.set_field(&mut record, 11, stan.as_bytes()).unwrap();

                let mut wire = [0u8; 64];
                let size = engine.encode_wire(&record, &mut wire).unwrap();

                let mut decoded = MessageRecord::new();
                engine.decode_wire(&wire[..size], &mut decoded).unwrap();
                assert_eq!(engine.read_field(&decoded, 11).unwrap(), stan.as_bytes());
            });
        }
    });
}

#[test]
fn test_error_conditions() {
    let engine = pos_engine();
    let mut record = MessageRecord::new();

    assert_eq!(
        engine.set_field(&mut record, 1, b"x"),
        Err(Error::InvalidFieldNumber)
    );
    assert_eq!(
        engine.set_field(&mut record, 4, b""),
        Err(Error::InvalidFieldLength)
    );

    // Fill the packed buffer with the big private fields
    engine.set_field(&mut record, 62, &[b'a'; 999]).unwrap();
    assert_eq!(
        engine.set_field(&mut record, 63, &[b'b'; 30]),
        Err(Error::BufferOverflow)
    );
    assert_eq!(record.offset(), 999);
    assert_eq!(engine.read_field(&record, 62).unwrap(), vec![b'a'; 999]);

    // Output buffer too small
    engine.set_field(&mut record, 0, b"0800").unwrap();
    let mut wire = [0u8; 100];
    assert_eq!(
        engine.encode_wire(&record, &mut wire),
        Err(Error::OutputBufferTooSmall)
    );

    // Truncated wire
    let mut wire = [0u8; 1100];
    let size = engine.encode_wire(&record, &mut wire).unwrap();
    let mut decoded = MessageRecord::new();
    assert_eq!(
        engine.decode_wire(&wire[..size - 1], &mut decoded),
        Err(Error::UnexpectedEof)
    );
}

#[test]
fn test_error_display() {
    assert_eq!(
        Error::SchemaNotConfigured.to_string(),
        "field schema has not been configured"
    );
    assert_eq!(
        Error::VariableLengthExceedsSchema.to_string(),
        "variable field length exceeds schema maximum"
    );

    let boxed: Box<dyn std::error::Error> = Box::new(Error::BufferOverflow);
    assert_eq!(boxed.to_string(), "packed record buffer capacity exceeded");
}

#[test]
fn test_strict_policy_end_to_end() {
    let engine = Engine::with_schema(
        presets::pos_64_schema()
            .unwrap()
            .with_digit_policy(DigitPolicy::Strict),
    );
    let mut record = MessageRecord::new();

    assert_eq!(
        engine.set_field(&mut record, 4, b"12.50"),
        Err(Error::InvalidDigit)
    );

    engine.set_field(&mut record, 0, b"08A0").unwrap();
    engine.set_field(&mut record, 4, b"1250").unwrap();
    let mut wire = [0u8; 64];
    let size = engine.encode_wire(&record, &mut wire).unwrap();
    assert_eq!(&wire[..2], &[0x08, 0xA0]);

    engine.set_field(&mut record, 0, b"08-0").unwrap();
    assert_eq!(
        engine.encode_wire(&record, &mut wire),
        Err(Error::InvalidDigit)
    );

    let mut decoded = MessageRecord::new();
    engine.decode_wire(&wire[..size], &mut decoded).unwrap();
    assert_eq!(decoded.mti(), b"08A0");
}

#[cfg(feature = "serde")]
#[test]
fn test_schema_from_json() {
    let schema = presets::pos_64_schema()
        .unwrap()
        .with_digit_policy(DigitPolicy::Strict);
    let json = serde_json::to_string(&schema).unwrap();
    let loaded: Schema = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, schema);

    let mut engine = Engine::new();
    engine.configure_schema(loaded).unwrap();
    assert_eq!(engine.schema().unwrap().digit_policy(), DigitPolicy::Strict);

    // Defaults apply to omitted settings; the table size is still checked
    let short = r#"{"mode":"Primary","formats":[{"field_type":16,"max_length":6}]}"#;
    let loaded: Schema = serde_json::from_str(short).unwrap();
    assert_eq!(loaded.pan_field(), Some(2));
    assert_eq!(engine.configure_schema(loaded), Err(Error::InvalidSchema));
}
