use radiocfg::{
    errors::{DecodeError, WalkError},
    radio::{
        general::radio_layout,
        model::{GVAR_INHERITED, model_layout},
    },
    text::{self, Entry},
    walker,
};

const RADIO_TEXT: &str = "\
version: 221
vBatWarn: 90
beepMode: mode_alarms
varioPitch: 20
trainerMode: MASTER_TRAINER_JACK
switchConfig:
  SA:
    type: 2pos
    name: Arm
  SF:
    type: toggle
potsConfig:
  P3:
    type: multipos_switch
ttsLanguage: en
currModelFilename: model01.yml
";

const MODEL_TEXT: &str = "\
header:
  name: \" Cub\"
  modelId:
    0: 4
mixData:
  0:
    weight: 100
    destCh: 0
    srcRaw: Ail
    swtch: SF2
  1:
    weight: -GV3
    destCh: 1
    srcRaw: I1
    offset: GV1
logicalSw:
  5:
    func: FUNC_EDGE
    v1: '!L1'
    v2: SA2
    duration: 4
customFn:
  0:
    swtch: L6
    func: ADJUST_GVAR
    fp:
      all:
        val: -7
        param: 2
    active: 1
  1:
    swtch: ON
    func: PLAY_TRACK
    fp:
      play:
        name: intro
switchWarningState: AuBdC-
moduleData:
  0:
    type: TYPE_R9M_PXX1
    mod:
      pxx:
        power: 2
        antennaMode: 1
";

/// A model buffer with every non-default flight mode inheriting its gvars.
fn model_defaults() -> Vec<u8> {
    let layout = model_layout().unwrap();
    let mut data = layout.zeroed();
    for fm in 1..9 {
        for gv in 0..9 {
            layout
                .set_int(&mut data, &format!("flightModeData.{fm}.gvars.{gv}"), GVAR_INHERITED)
                .unwrap();
        }
    }
    data
}

#[test]
fn test_radio_text_round_trip() {
    let layout = radio_layout().unwrap();
    let encoded = walker::read_text(layout, RADIO_TEXT).unwrap();
    assert!(encoded.issues.is_empty(), "{:?}", encoded.issues);
    assert_eq!(layout.get_text(&encoded.bytes, "currModelFilename").unwrap(), "model01.yml");

    let mut out = String::new();
    walker::write_text(layout, &encoded.bytes, &mut out).unwrap();
    let again = walker::read_text(layout, &out).unwrap();
    assert_eq!(again.bytes, encoded.bytes);

    let decoded = text::parse(&out).unwrap();
    let switches = text::find(&decoded, "switchConfig").and_then(Entry::as_block).unwrap();
    assert_eq!(switches.len(), 10);
    assert_eq!(
        text::find_path(&decoded, "switchConfig.SA.name").and_then(Entry::as_scalar),
        Some("Arm")
    );
}

#[test]
fn test_model_text_round_trip() {
    let layout = model_layout().unwrap();
    let mut data = model_defaults();
    let issues = walker::encode_into(layout, &text::parse(MODEL_TEXT).unwrap(), &mut data).unwrap();
    assert!(issues.is_empty(), "{issues:?}");
    assert_eq!(layout.get_text(&data, "header.name").unwrap(), " Cub");
    assert_eq!(layout.get_int(&data, "header.modelId.0").unwrap(), 4);
    assert_eq!(layout.get_int(&data, "customFn.0.fp.all.val").unwrap(), -7);
    assert_eq!(layout.get_text(&data, "customFn.1.fp.play.name").unwrap(), "intro");

    let rendered = text::render(&walker::decode(layout, &data).unwrap()).unwrap();
    assert!(rendered.contains("  name: ' Cub'\n"));
    assert!(rendered.contains("    v1: '!L1'\n"));
    assert!(!rendered.contains("flightModeData"));

    let mut again = model_defaults();
    walker::encode_into(layout, &text::parse(&rendered).unwrap(), &mut again).unwrap();
    assert_eq!(again, data);
}

#[test]
fn test_lenient_read_reports_and_zero_fills() {
    let layout = model_layout().unwrap();
    let entries = text::parse(
        "mixData:\n  2:\n    srcRaw: Rud\n    weight: GV12\n    swtch: SZ1\n    destCh: 3\n",
    )
    .unwrap();
    let encoded = walker::encode(layout, &entries).unwrap();

    let paths: Vec<_> = encoded.issues.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, ["mixData.2.weight", "mixData.2.swtch"]);
    assert!(matches!(encoded.issues[1].error, DecodeError::UnknownName { .. }));
    assert_eq!(layout.get_int(&encoded.bytes, "mixData.2.weight").unwrap(), 0);
    assert_eq!(layout.get_int(&encoded.bytes, "mixData.2.swtch").unwrap(), 0);
    assert_eq!(layout.get_int(&encoded.bytes, "mixData.2.destCh").unwrap(), 3);
}

#[test]
fn test_strict_read_rejects() {
    let layout = model_layout().unwrap();
    let entries = text::parse("moduleData:\n  1:\n    type: TYPE_WIFI\n").unwrap();
    let err = walker::encode_strict(layout, &entries).unwrap_err();
    assert!(matches!(
        err,
        WalkError::Rejected { ref path, source: DecodeError::UnknownName { .. } } if path == "moduleData.1.type"
    ));
}

#[test]
fn test_encode_into_keeps_absent_fields() {
    let layout = radio_layout().unwrap();
    let mut data = walker::read_text(layout, RADIO_TEXT).unwrap().bytes;
    walker::encode_into(layout, &[Entry::scalar("vBatWarn", "70")], &mut data).unwrap();

    assert_eq!(layout.get_int(&data, "vBatWarn").unwrap(), 70);
    assert_eq!(layout.get_int(&data, "version").unwrap(), 221);
    assert_eq!(layout.get_text(&data, "ttsLanguage").unwrap(), "en");
}

#[test]
fn test_parse_errors_surface() {
    let layout = radio_layout().unwrap();
    assert!(matches!(
        walker::read_text(layout, "version 221\n"),
        Err(WalkError::Text(_))
    ));
    assert!(matches!(
        walker::decode(layout, &[0; 12]),
        Err(WalkError::BufferSize { expected: 91, found: 12 })
    ));
}

#[test]
fn test_out_of_range_number_is_a_field_issue() {
    let layout = radio_layout().unwrap();
    let input = "version: 221\nvBatMin: -9223372036854775807\nvBatWarn: 66\n";

    let encoded = walker::read_text(layout, input).unwrap();
    assert_eq!(encoded.issues.len(), 1);
    assert_eq!(encoded.issues[0].path, "vBatMin");
    assert!(matches!(encoded.issues[0].error, DecodeError::InvalidNumber(_)));
    assert_eq!(layout.get_int(&encoded.bytes, "vBatMin").unwrap(), 0);
    assert_eq!(layout.get_int(&encoded.bytes, "vBatWarn").unwrap(), 66);

    let err = walker::encode_strict(layout, &text::parse(input).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        WalkError::Rejected { ref path, source: DecodeError::InvalidNumber(_) } if path == "vBatMin"
    ));
}

#[test]
fn test_names_with_control_bytes_round_trip() {
    let layout = model_layout().unwrap();
    let mut data = model_defaults();
    layout.set_text(&mut data, "header.name", "A\nB\t\"c\": #\u{e9}").unwrap();
    layout.set_text(&mut data, "mixData.0.name", "\r\u{1}\u{85}").unwrap();
    layout.set_int(&mut data, "mixData.0.srcRaw", 1).unwrap();

    let mut out = String::new();
    walker::write_text(layout, &data, &mut out).unwrap();

    let mut again = model_defaults();
    let issues = walker::encode_into(layout, &text::parse(&out).unwrap(), &mut again).unwrap();
    assert!(issues.is_empty(), "{issues:?}");
    assert_eq!(again, data);
}
