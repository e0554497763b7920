use relancers_coding::coding::{
    Coder, CoderConfig, CoderFactory, CodingError, Decoder, Encoder, FeedbackExtension,
    FeedbackReader, FeedbackWriter, Recoder, RlnDecoder, RlnEncoder,
};
use relancers_coding::storage::CoefficientVector;
use relancers_coding::{AESTowerField8b as GF256, BiniusField, BinaryField16b};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn block(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 13 + 5) as u8).collect()
}

/// Rows of `L * U` with unit diagonals, hence invertible
fn invertible_rows(k: usize) -> Vec<CoefficientVector<GF256>> {
    let entry = |i: usize, j: usize| GF256::from((i * k + j + 2) as u8);
    let lower = |i: usize, j: usize| match i.cmp(&j) {
        std::cmp::Ordering::Equal => GF256::ONE,
        std::cmp::Ordering::Greater => entry(i, j),
        std::cmp::Ordering::Less => GF256::ZERO,
    };
    let upper = |i: usize, j: usize| lower(j, i);

    (0..k)
        .map(|i| {
            let row = (0..k)
                .map(|j| {
                    (0..k).fold(GF256::ZERO, |acc, t| acc + lower(i, t) * upper(t, j))
                })
                .collect();
            CoefficientVector::from_values(row)
        })
        .collect()
}

#[test]
fn four_dense_packets_decode_and_fifth_changes_nothing() {
    init_logging();
    let (symbols, symbol_size) = (4, 8);
    let data = block(symbols * symbol_size);

    let mut encoder = RlnEncoder::<GF256>::with_seed([1; 32]);
    let mut decoder = RlnDecoder::<GF256>::new();
    encoder.configure(symbols, symbol_size).unwrap();
    decoder.configure(symbols, symbol_size).unwrap();
    encoder.set_symbols(&data).unwrap();

    for (i, coefficients) in invertible_rows(symbols).iter().enumerate() {
        let symbol = encoder.encode_symbol(coefficients).unwrap();
        assert!(decoder.decode_symbol(coefficients, &symbol).unwrap());
        assert_eq!(decoder.rank(), i + 1);
    }
    assert!(decoder.is_complete());
    let decoded = decoder.decode_all().unwrap();
    assert_eq!(decoded, data);

    let (coefficients, symbol) = encoder.encode_packet().unwrap();
    assert!(!decoder.decode_symbol(&coefficients, &symbol).unwrap());
    assert_eq!(decoder.rank(), symbols);
    assert_eq!(decoder.decode_all().unwrap(), decoded);
}

#[test]
fn systematic_symbols_are_readable_immediately() {
    init_logging();
    let data = block(4 * 8);
    let mut encoder = RlnEncoder::<GF256>::new();
    let mut decoder = RlnDecoder::<GF256>::new();
    encoder.configure(4, 8).unwrap();
    decoder.configure(4, 8).unwrap();
    encoder.set_symbols(&data).unwrap();

    let mut payload = vec![0u8; encoder.payload_size()];
    for i in 0..4 {
        encoder.encode(&mut payload).unwrap();
        assert!(decoder.decode(&payload).unwrap());
        assert_eq!(decoder.symbol(i), Some(&data[i * 8..(i + 1) * 8]));
        assert_eq!(decoder.symbols_decoded(), i + 1);
    }
    assert!(decoder.is_complete());
}

#[test]
fn partial_decoding_before_completion() {
    let data = block(3 * 4);
    let mut encoder = RlnEncoder::<GF256>::with_seed([9; 32]);
    let mut decoder = RlnDecoder::<GF256>::new();
    encoder.configure(3, 4).unwrap();
    decoder.configure(3, 4).unwrap();
    encoder.set_symbols(&data).unwrap();

    let mixed = CoefficientVector::from_values(vec![GF256::ONE, GF256::ONE, GF256::ZERO]);
    decoder
        .decode_symbol(&mixed, &encoder.encode_symbol(&mixed).unwrap())
        .unwrap();
    assert_eq!(decoder.symbol(0), None);

    decoder.decode_systematic_symbol(1, &data[4..8]).unwrap();
    assert_eq!(decoder.rank(), 2);
    assert_eq!(decoder.symbol(0), Some(&data[0..4]));
    assert_eq!(decoder.symbol(2), None);
    assert_eq!(decoder.decode_all(), Err(CodingError::InsufficientData));
}

#[test]
fn seeded_packets_with_losses() {
    init_logging();
    let config = CoderConfig::default().with_seed_ids(7).with_rng_seed([4; 32]);
    let data = block(6 * 10);
    let mut encoder = RlnEncoder::<GF256>::with_config(config.clone()).unwrap();
    let mut decoder = RlnDecoder::<GF256>::with_config(config).unwrap();
    encoder.configure(6, 10).unwrap();
    decoder.configure(6, 10).unwrap();
    encoder.set_symbols(&data).unwrap();
    assert_eq!(encoder.payload_size(), 14);

    let mut payload = vec![0u8; encoder.payload_size()];
    let mut sent = 0;
    while !decoder.is_complete() && sent < 100 {
        encoder.encode(&mut payload).unwrap();
        sent += 1;
        // Drop every third packet
        if sent % 3 == 0 {
            continue;
        }
        decoder.decode(&payload).unwrap();
    }
    assert!(decoder.is_complete());
    assert_eq!(decoder.decode_all().unwrap(), data);
}

#[test]
fn status_aware_encoder_targets_missing_symbols() {
    init_logging();
    let config = CoderConfig::default()
        .with_status_awareness(true)
        .with_feedback_extension(FeedbackExtension::Rank)
        .with_rng_seed([12; 32]);
    let data = block(4 * 8);
    let mut encoder = RlnEncoder::<GF256>::with_config(config.clone()).unwrap();
    let mut decoder = RlnDecoder::<GF256>::with_config(config).unwrap();
    encoder.configure(4, 8).unwrap();
    decoder.configure(4, 8).unwrap();
    encoder.set_symbols(&data).unwrap();

    // Systematic packets for symbols 1 and 3 are lost
    let mut payload = vec![0u8; encoder.payload_size()];
    for index in 0..4 {
        encoder.encode(&mut payload).unwrap();
        if index % 2 == 0 {
            decoder.decode(&payload).unwrap();
        }
    }

    let mut feedback = vec![0u8; decoder.feedback_size()];
    decoder.write_feedback(&mut feedback).unwrap();
    encoder.read_feedback(&feedback).unwrap();
    assert_eq!(encoder.remote_status().map(|remote| remote.rank()), Some(2));

    let mut sent = 0;
    while !decoder.is_complete() && sent < 20 {
        encoder.encode(&mut payload).unwrap();
        let coefficients = CoefficientVector::<GF256>::unpack(&payload, 4).unwrap();
        assert_eq!(coefficients[0], GF256::ZERO);
        assert_eq!(coefficients[2], GF256::ZERO);
        decoder.decode(&payload).unwrap();
        sent += 1;
    }
    assert!(decoder.is_complete());
    assert_eq!(decoder.decode_all().unwrap(), data);
}

#[test]
fn relay_recodes_toward_sink() {
    init_logging();
    let config = CoderConfig::default()
        .with_systematic(false)
        .with_recoding(true)
        .with_status_awareness(true)
        .with_rng_seed([21; 32]);
    let factory = CoderFactory::<GF256>::new(8, 16, config).unwrap();
    let data = block(8 * 16);

    let mut source = factory.build_encoder(8, 16).unwrap();
    let mut relay = factory.build_decoder(8, 16).unwrap();
    let mut sink = factory.build_decoder(8, 16).unwrap();
    source.set_symbols(&data).unwrap();

    let mut payload = vec![0u8; factory.max_payload_size()];
    let mut feedback = vec![0u8; factory.max_feedback_size()];

    // Relay holds half the generation
    while relay.rank() < 4 {
        let written = source.encode(&mut payload).unwrap();
        relay.decode(&payload[..written]).unwrap();
    }

    let mut sent = 0;
    while sink.rank() < relay.rank() && sent < 50 {
        let written = relay.recode(&mut payload).unwrap();
        sink.decode(&payload[..written]).unwrap();
        let size = sink.write_feedback(&mut feedback).unwrap();
        relay.read_feedback(&feedback[..size]).unwrap();
        sent += 1;
    }
    assert_eq!(sink.rank(), 4);

    // Nothing the relay sends can lift the sink above the relay
    for _ in 0..10 {
        let written = relay.recode(&mut payload).unwrap();
        assert!(!sink.decode(&payload[..written]).unwrap());
    }

    while !relay.is_complete() {
        let written = source.encode(&mut payload).unwrap();
        relay.decode(&payload[..written]).unwrap();
    }
    let mut sent = 0;
    while !sink.is_complete() && sent < 50 {
        let written = relay.recode(&mut payload).unwrap();
        sink.decode(&payload[..written]).unwrap();
        sent += 1;
    }
    assert_eq!(sink.decode_all().unwrap(), data);
}

#[test]
fn wide_field_round_trip() {
    let data = block(5 * 6);
    let config = CoderConfig::default()
        .with_systematic(false)
        .with_rng_seed([30; 32]);
    let mut encoder = RlnEncoder::<BinaryField16b>::with_config(config).unwrap();
    let mut decoder = RlnDecoder::<BinaryField16b>::new();
    encoder.configure(5, 6).unwrap();
    decoder.configure(5, 6).unwrap();
    encoder.set_symbols(&data).unwrap();
    assert_eq!(encoder.id_size(), 10);

    let mut payload = vec![0u8; encoder.payload_size()];
    let mut sent = 0;
    while !decoder.is_complete() && sent < 50 {
        encoder.encode(&mut payload).unwrap();
        decoder.decode(&payload).unwrap();
        sent += 1;
    }
    assert_eq!(decoder.decode_all().unwrap(), data);

    assert_eq!(
        RlnDecoder::<BinaryField16b>::new().configure(5, 7),
        Err(CodingError::InvalidSymbolSize)
    );
}

#[test]
fn coders_are_reusable_after_reset() {
    let factory = CoderFactory::<GF256>::new(4, 4, CoderConfig::default()).unwrap();
    let mut encoder = factory.build_encoder(4, 4).unwrap();
    let mut decoder = factory.build_decoder(4, 4).unwrap();
    let mut payload = vec![0u8; factory.max_payload_size()];

    for round in 0..3u8 {
        let data: Vec<u8> = (0..16).map(|i| i ^ round).collect();
        encoder.set_symbols(&data).unwrap();
        while !decoder.is_complete() {
            encoder.encode(&mut payload).unwrap();
            decoder.decode(&payload).unwrap();
        }
        assert_eq!(decoder.decode_all().unwrap(), data);

        encoder.reset();
        decoder.reset();
        assert_eq!(decoder.rank(), 0);
    }
}
