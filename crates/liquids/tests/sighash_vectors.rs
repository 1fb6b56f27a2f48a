//! End-to-end vectors: full transaction buffers with their expected IDs and
//! sighash digests, exercising each serialization feature and all three
//! sighash dialects.

use liquids::prelude::*;

/// (a) A coinbase: null prevout, explicit zero-value commitment output.
static COINBASE_HEX: &str = "0200000000010000000000000000000000000000000000000000000000000000000000000000ffffffff03510101ffffffff01016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f01000000000000000000266a24aa21a9ed94f15ed3a62165e4a0b99699cc28b48e19cb5bc1b1f47155db62d63f1e047d4500000000";

/// (b) A plain 1-in 2-out payment, no witness data.
static SIMPLE_SPEND_HEX: &str = "02000000000111111111111111111111111111111111111111111111111111111111111111110000000000feffffff02016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f010000000005f5d41c001976a914f54a5851e9372b87810a8e60cdd2e7cfd80b6e3188ac016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f010000000000000ce4000065000000";

/// (c) A confidential spend: committed asset/value/nonce, surjection and
/// range proofs, and a two-item script witness.
static CONFIDENTIAL_HEX: &str = "02000000010111111111111111111111111111111111111111111111111111111111111111110100000000ffffffff020abbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb08cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc02dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd160014f54a5851e9372b87810a8e60cdd2e7cfd80b6e31016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f0100000000000013880000000000000000020830440220222211112102eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee00060100deadbeef06602afeedface0000";

/// (d) An asset issuance on the sole input.
static ISSUANCE_HEX: &str = "02000000000111111111111111111111111111111111111111111111111111111111111111110200008000ffffffff000000000000000000000000000000000000000000000000000000000000000077777777777777777777777777777777777777777777777777777777777777770100000000000f424000020199999999999999999999999999999999999999999999999999999999999999990100000000000f4240000151016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f010000000000000190000000000000";

/// (e) A 2-in 2-out taproot spend, key path.
static TAPROOT_HEX: &str = "02000000000211111111111111111111111111111111111111111111111111111111111111110000000000fdffffff44444444444444444444444444444444444444444444444444444444444444440300000000fdffffff020abbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb08cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc02dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd225120abababababababababababababababababababababababababababababababab016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f0100000000000000fa000000000000";

/// (f) A taproot script-path spend with an annex, a blinded issuance on the
/// second input, and confidential outputs.
static TAPROOT_ISSUANCE_HEX: &str = "02000000010211111111111111111111111111111111111111111111111111111111111111110000000000ffffffff44444444444444444444444444444444444444444444444444444444444444440100008000feffffffababababababababababababababababababababababababababababababababcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcd08efefefefefefefefefefefefefefefefefefefefefefefefefefefefefefefef0002016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f01000000000000271000225120abababababababababababababababababababababababababababababababab0abbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb08cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc02dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd225120cdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcd20a10700000000000c616161616161616161616161000140ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff000000030100aa022bcd";

/// The prevout script signed in the legacy and v0 vectors.
static PREVOUT_SCRIPT_HEX: &str = "76a914f54a5851e9372b87810a8e60cdd2e7cfd80b6e3188ac";

/// The Liquid mainnet genesis block hash, block-explorer order.
static GENESIS_BE_HEX: &str = "1466275836220db2944ca059a3a10ef6fd2ea684b0688d2c379296888a206003";

fn digest_hex(digest: Hash256Digest) -> String {
    hex::encode(digest)
}

fn roundtrip(hex_str: &str) -> LiquidTx {
    let buf = hex::decode(hex_str).unwrap();
    let tx = LiquidTx::from_bytes(&buf, false).unwrap();
    assert_eq!(tx.to_bytes(true).unwrap(), buf, "byte-exact round trip");
    assert_eq!(tx.serialized_length(), buf.len());
    tx
}

#[test]
fn it_handles_coinbases() {
    let tx = roundtrip(COINBASE_HEX);
    assert!(tx.is_coinbase());
    assert_eq!(
        tx.txid().unwrap().serialize_hex().unwrap(),
        "c7fb37abc6201f3278e89b52414ca90bc2aad123ba47c7907a81528c7b0135e6"
    );
    assert_eq!(tx.wtxid().unwrap(), WTXID::default());
    // no witness data, so the base and total sizes agree
    assert_eq!(tx.base_size(), tx.total_size());
}

#[test]
fn it_computes_simple_spend_ids_and_sighashes() {
    let tx = roundtrip(SIMPLE_SPEND_HEX);
    assert!(!tx.is_coinbase());
    assert_eq!(
        tx.txid().unwrap().serialize_hex().unwrap(),
        "f28da89b5c1fd56a0c39818f53d416e9b3b2b372b84259a0eb9516728008d7ba"
    );
    // without witnesses the wtxid is the unreversed txid preimage hash
    assert_eq!(
        tx.wtxid().unwrap().serialize_hex().unwrap(),
        "bad70880721695eba05942b872b3b2b3e916d4538f81390c6ad51f5c9ba88df2"
    );

    let prevout_script = Script::new(hex::decode(PREVOUT_SCRIPT_HEX).unwrap());
    let cases = [
        (SIGHASH_ALL, "aa8975d88eedd8d0fb136197dca066a84ef4f4fd1021de6d7c33dce9450919bb"),
        (SIGHASH_NONE, "44f46b1cec7907278fc1dcb4c223a3c29227ac61503ed9ce74069d4d6e9e1d3c"),
        (SIGHASH_SINGLE, "289bbda3360894a2f419d8a64cdf0b7331c45345731b6d54f4e8998ea8d3ccb3"),
        (
            SIGHASH_ALL | SIGHASH_ANYONECANPAY,
            "046eb95cb366bfe70274ed9224bc6d80cbf312c889a28cc7c6cac5c7ac2214e7",
        ),
    ];
    for (flag, expected) in cases.iter() {
        let args = LegacySighashArgs {
            index: 0,
            sighash_flag: *flag,
            prevout_script: &prevout_script,
        };
        assert_eq!(digest_hex(tx.legacy_sighash(&args).unwrap()), *expected);
    }

    let prevout_value = ConfidentialValue::explicit(100_000_000);
    let mut args = WitnessV0SighashArgs {
        index: 0,
        sighash_flag: SIGHASH_ALL,
        prevout_script: &prevout_script,
        prevout_value: &prevout_value,
    };
    assert_eq!(
        digest_hex(tx.witness_v0_sighash(&args).unwrap()),
        "87a14d6b20740ab7d71e36ec84c3a022594ef50bd6f09a52babda8c132201c89"
    );
    args.sighash_flag = SIGHASH_SINGLE | SIGHASH_ANYONECANPAY;
    assert_eq!(
        digest_hex(tx.witness_v0_sighash(&args).unwrap()),
        "2cfe2f5424521d41a38dbe8801bed6d8feefadef9ca6b11f419ada77977caa20"
    );
}

#[test]
fn it_round_trips_confidential_transactions() {
    let tx = roundtrip(CONFIDENTIAL_HEX);
    assert!(tx.has_witnesses());
    assert_eq!(tx.flag, ADVANCED_TRANSACTION_FLAG);

    let output = &tx.vout[0];
    assert!(output.asset.is_confidential());
    assert!(output.value.is_confidential());
    assert!(output.nonce.is_confidential());
    assert!(output.witness.is_witnessed());
    assert_eq!(tx.vin[0].witness.script_witness.len(), 2);

    assert_eq!(
        tx.txid().unwrap().serialize_hex().unwrap(),
        "d848c83ad820d8632be166533a22fa41d72e3f435ce4fd1a0a11f4fefdcd2094"
    );
    assert_eq!(
        tx.wtxid().unwrap().serialize_hex().unwrap(),
        "8995699b6a08016a90c9f112a3cfb4a8e472e3a4c2a32ddaf4c229bed385a580"
    );

    assert_eq!(tx.base_size(), 218);
    assert_eq!(tx.total_size(), 281);
    assert_eq!(tx.weight(), 935);
    assert_eq!(tx.vsize(), 234);
    assert_eq!(tx.to_bytes(false).unwrap().len(), tx.base_size());

    // legacy signing of a witness transaction blinds the output values
    let prevout_script = Script::new(hex::decode(PREVOUT_SCRIPT_HEX).unwrap());
    let args = LegacySighashArgs {
        index: 0,
        sighash_flag: SIGHASH_ALL,
        prevout_script: &prevout_script,
    };
    assert_eq!(
        digest_hex(tx.legacy_sighash(&args).unwrap()),
        "5031b4ce8129123d1ac54e520e986d302d680568ff65b0a5de1cb1b24d7e6ce4"
    );
}

#[test]
fn it_handles_issuance_inputs() {
    let tx = roundtrip(ISSUANCE_HEX);
    let input = &tx.vin[0];

    assert_eq!(input.outpoint.idx, 2);
    assert!(!input.is_pegin);
    let issuance = input.issuance.as_ref().unwrap();
    assert_eq!(issuance.asset_entropy, [0x77u8; 32]);
    assert_eq!(issuance.amount.explicit_value(), Some(1_000_000));
    assert!(issuance.inflation_keys.is_null());

    // the first output pays the newly issued asset in the clear
    assert_eq!(tx.vout[0].asset.explicit_tag(), Some([0x99u8; 32]));
    assert_eq!(tx.vout[0].value.explicit_value(), Some(1_000_000));

    // the wire form packs the issuance bit back into the index:
    // version(4) + flag(1) + count(1) + txid(32) puts it at offset 38
    let buf = tx.to_bytes(true).unwrap();
    assert_eq!(&buf[38..42], &[0x02, 0x00, 0x00, 0x80]);

    assert_eq!(
        tx.txid().unwrap().serialize_hex().unwrap(),
        "f2a3df17ca58b444efa9d004ee221a38521d1206973fd673f905e8b5b4e1e18d"
    );

    let prevout_script = Script::new(hex::decode(PREVOUT_SCRIPT_HEX).unwrap());
    let args = LegacySighashArgs {
        index: 0,
        sighash_flag: SIGHASH_ALL,
        prevout_script: &prevout_script,
    };
    assert_eq!(
        digest_hex(tx.legacy_sighash(&args).unwrap()),
        "34e8435cd77a3b1f1c24e5dfffaacc267105f1c778ce735c262310283e94720f"
    );

    let prevout_value = ConfidentialValue::explicit(1_003_300);
    let args = WitnessV0SighashArgs {
        index: 0,
        sighash_flag: SIGHASH_ALL,
        prevout_script: &prevout_script,
        prevout_value: &prevout_value,
    };
    assert_eq!(
        digest_hex(tx.witness_v0_sighash(&args).unwrap()),
        "1d7560032692467356526f53c05972b503d6a8a1650ff29aef60c91e93e73d68"
    );
}

fn taproot_companions() -> (Vec<ScriptPubkey>, Vec<SpentOutput>) {
    let scripts = vec![
        ScriptPubkey::new(hex::decode(format!("5120{}", "12".repeat(32))).unwrap()),
        ScriptPubkey::new(hex::decode(format!("5120{}", "34".repeat(32))).unwrap()),
    ];
    let spents = vec![
        SpentOutput {
            asset: ConfidentialAsset::deserialize_hex(
                "016d521c38ec1ea15734ae22b7c46064412829c0d0579f0a713d1c04ede979026f",
            )
            .unwrap(),
            value: ConfidentialValue::explicit(40_000),
        },
        SpentOutput {
            asset: ConfidentialAsset::deserialize_hex(&format!("0b{}", "56".repeat(32)))
                .unwrap(),
            value: ConfidentialValue::deserialize_hex(&format!("09{}", "78".repeat(32)))
                .unwrap(),
        },
    ];
    (scripts, spents)
}

#[test]
fn it_computes_taproot_key_path_sighashes() {
    let tx = roundtrip(TAPROOT_HEX);
    let (scripts, spents) = taproot_companions();
    let genesis = BlockHash::from_be_hex(GENESIS_BE_HEX).unwrap();

    let mut args = TaprootSighashArgs {
        index: 0,
        sighash_flag: SIGHASH_DEFAULT as u8,
        prev_scripts: &scripts,
        spent_outputs: &spents,
        genesis_hash: genesis,
        leaf_hash: None,
        annex: None,
    };
    assert_eq!(
        digest_hex(tx.taproot_sighash(&args).unwrap()),
        "b815f5cf40dc82fd747cadb576fe4d14e2ef89c29964b7766bcd81ac20a70078"
    );

    args.sighash_flag = SIGHASH_ALL as u8;
    assert_eq!(
        digest_hex(tx.taproot_sighash(&args).unwrap()),
        "03e203b212a8daf3a5d3e46edd7d5b79b32bbe992a7807c272c773a1f1e68470"
    );

    args.sighash_flag = SIGHASH_NONE as u8;
    args.index = 1;
    assert_eq!(
        digest_hex(tx.taproot_sighash(&args).unwrap()),
        "9b2c8826e7fd048b0426bec1197c241b5b35e53718c97dcca506d5c6d796346d"
    );
}

#[test]
fn it_computes_taproot_script_path_sighashes() {
    let tx = roundtrip(TAPROOT_ISSUANCE_HEX);
    assert!(tx.vin[1].issuance.is_some());
    assert!(!tx.vin[1].witness.issuance_range_proof.is_empty());
    assert_eq!(
        tx.txid().unwrap().serialize_hex().unwrap(),
        "74c97ab9d7cdc5d806b75e1da2a3f783622427a7f9ce0e64c51d4b3a34a2a41e"
    );
    assert_eq!(
        tx.wtxid().unwrap().serialize_hex().unwrap(),
        "e00d48abc958e4fc93ba68d1408cfb7fa4e4c6cf05d1e28f6ff6e7745bcec8f1"
    );

    let (scripts, spents) = taproot_companions();
    let genesis = BlockHash::from_be_hex(GENESIS_BE_HEX).unwrap();
    let leaf_hash = Hash256Digest::deserialize_hex(
        "e4b7d2cb312c9c5a0f0b492f4e223b37c5c173761454a33a3b9b9a4e0b1f2b3c",
    )
    .unwrap();
    let annex = hex::decode("50aabbcc").unwrap();

    let mut args = TaprootSighashArgs {
        index: 1,
        sighash_flag: (SIGHASH_SINGLE | SIGHASH_ANYONECANPAY) as u8,
        prev_scripts: &scripts,
        spent_outputs: &spents,
        genesis_hash: genesis,
        leaf_hash: Some(leaf_hash),
        annex: Some(&annex),
    };
    assert_eq!(
        digest_hex(tx.taproot_sighash(&args).unwrap()),
        "68f6d27412fa1c4ff5f5920ca499a94a622d1838fb0d4d665201bbfc3456b9ca"
    );

    // the same input signed key-path without the annex commits differently
    args.leaf_hash = None;
    args.annex = None;
    assert_eq!(
        digest_hex(tx.taproot_sighash(&args).unwrap()),
        "da23fb99122e1b0486ebba7ff310d95e9a71982090abada8cd4022be68a4c501"
    );
}
