//! Chain-level invariants checked over hand-picked families of chains.

use serde_json::{Value, json};

use opchain_core::Resolution;
use opchain_ops::{OpContext, Operator, normalize};
use opchain_process::{ColorProcessor, OverlayProcessor, Processor, RepositionProcessor, compose};

fn geometric_chains() -> Vec<Value> {
    vec![
        json!([{"kind": "crop", "x": 10.5, "y": 3, "w": 1600, "h": 900}]),
        json!([
            {"kind": "transform", "translate": [12.25, -7.5], "rotate": 33.3, "scale": [1.1, 0.9],
             "center": [960, 540], "skew_x": 4.0, "skew_order": "yx"},
            {"kind": "resize", "w": 1280, "h": 0, "fit": "width"},
        ]),
        json!([
            {"kind": "crop", "box": [0.1, 0.1, 0.8, 0.8], "relative": true},
            {"kind": "mirror", "flip": true, "flop": true},
            {"kind": "resize", "w": 2048, "h": 858, "fit": "letterbox"},
        ]),
        json!([
            {"kind": "matrix", "matrix": [1.0, 0.2, 5.0, 0.0, 1.0, -3.0, 0.0, 0.0, 1.0]},
            {"kind": "transform", "rotate": -90, "invert": true},
        ]),
    ]
}

fn ctx() -> OpContext {
    OpContext::new(Resolution::HD)
}

#[test]
fn test_params_roundtrip_composite_bit_identical() {
    for chain in geometric_chains() {
        let ops = normalize(chain.clone()).unwrap();
        let rebuilt: Vec<Operator> = ops
            .iter()
            .map(|op| Operator::from_params(op.to_params()).unwrap())
            .collect();
        assert_eq!(rebuilt, ops, "{chain}");

        let a = compose(&ops, &ctx()).unwrap();
        let b = compose(&rebuilt, &ctx()).unwrap();
        let bits = |m: &opchain_math::Mat3| m.to_flat().map(f64::to_bits);
        assert_eq!(bits(&a.matrix), bits(&b.matrix), "{chain}");
        assert_eq!(a.canvas, b.canvas);
    }
}

#[test]
fn test_single_operator_composite_is_its_matrix() {
    for chain in geometric_chains() {
        let ops = normalize(chain).unwrap();
        let op = &ops[0];
        let c = compose(std::slice::from_ref(op), &ctx()).unwrap();
        assert_eq!(c.matrix, op.to_matrix(&ctx()).unwrap());
    }
}

#[test]
fn test_input_anchor_position_irrelevant() {
    let body = [
        json!({"kind": "lut", "file": "show.cube"}),
        json!({"kind": "cdl", "slope": [1.1, 1.0, 0.9]}),
        json!({"kind": "look", "name": "warm"}),
    ];
    let input = json!({"kind": "colorspace", "value": "ARRI LogC", "role": "input"});
    let output = json!({"kind": "colorspace", "value": "sRGB", "role": "output"});

    let at_ends: Vec<Value> = std::iter::once(input.clone())
        .chain(body.iter().cloned())
        .chain(std::iter::once(output.clone()))
        .collect();
    let expected = ColorProcessor::from_chain(at_ends).unwrap().compute().unwrap();

    for anchor in [&input, &output] {
        for pos in 0..=body.len() {
            let mut chain: Vec<Value> = body.to_vec();
            chain.insert(pos, anchor.clone());
            let other = if anchor == &input { &output } else { &input };
            chain.push(other.clone());
            let flags = ColorProcessor::from_chain(chain).unwrap().compute().unwrap();
            assert_eq!(flags, expected, "{anchor} at {pos}");
        }
    }
}

#[test]
fn test_unroled_output_relocated_within_body() {
    let expected = ColorProcessor::from_chain(json!([
        {"kind": "colorspace", "value": "ACEScg"},
        {"kind": "lut", "file": "a.cube"},
        {"kind": "look", "name": "b"},
        {"kind": "colorspace", "value": "sRGB"},
    ]))
    .unwrap()
    .compute()
    .unwrap();

    let moved = ColorProcessor::from_chain(json!([
        {"kind": "colorspace", "value": "ACEScg"},
        {"kind": "colorspace", "value": "sRGB"},
        {"kind": "lut", "file": "a.cube"},
        {"kind": "look", "name": "b"},
    ]))
    .unwrap()
    .compute()
    .unwrap();
    assert_eq!(moved, expected);
}

#[test]
fn test_compute_idempotent() {
    let color = ColorProcessor::from_chain(json!([
        {"kind": "colorspace", "value": "ACEScg"},
        {"kind": "cdl", "power": [1.2, 1.2, 1.2]},
        {"kind": "colorspace", "value": "sRGB"},
    ]))
    .unwrap();
    let overlay = OverlayProcessor::from_chain(json!({"kind": "text", "text": "slate"})).unwrap();
    let processors: Vec<Box<dyn Processor>> = std::iter::once(Box::new(color) as Box<dyn Processor>)
        .chain(geometric_chains().into_iter().map(|chain| {
            Box::new(RepositionProcessor::from_chain(Resolution::HD, chain).unwrap()) as Box<dyn Processor>
        }))
        .chain(std::iter::once(Box::new(overlay) as Box<dyn Processor>))
        .collect();

    for p in &processors {
        let first = p.compute().unwrap();
        assert_eq!(p.compute().unwrap(), first);
    }
}

#[test]
fn test_empty_chains() {
    assert!(ColorProcessor::new().compute().unwrap().is_empty());
    assert!(RepositionProcessor::new(Resolution::HD).compute().unwrap().is_empty());
    assert!(OverlayProcessor::new().compute().unwrap().is_empty());
    assert!(normalize(json!([])).unwrap().is_empty());
}
