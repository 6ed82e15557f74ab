use std::fs;

use saint_heatmap::data::matrix::ScoreMatrix;
use saint_heatmap::render::render_heatmap;
use saint_heatmap::{run, HeatmapConfig};
use tempfile::TempDir;

fn small_matrix() -> ScoreMatrix {
    ScoreMatrix::from_rows(
        vec!["VCP".into(), "PREY1".into(), "PREY2".into()],
        vec!["A".into(), "B".into()],
        vec![
            vec![Some(0.0), Some(1.0)],
            vec![None, Some(0.5)],
            vec![Some(1.7), Some(-0.2)],
        ],
    )
    .unwrap()
}

#[test]
#[ignore = "needs a serif font installed on the host"]
fn rendering_is_repeatable() {
    let tmp = TempDir::new().unwrap();
    let style = HeatmapConfig::default().style;
    let a = render_heatmap(&small_matrix(), &style, &tmp.path().join("a.png")).unwrap();
    let b = render_heatmap(&small_matrix(), &style, &tmp.path().join("b.png")).unwrap();
    assert_eq!((a.width, a.height), (b.width, b.height));

    let pa = image::open(&a.path).unwrap().to_rgb8();
    let pb = image::open(&b.path).unwrap().to_rgb8();
    assert_eq!(pa.dimensions(), (a.width, a.height));
    assert!(pa.pixels().eq(pb.pixels()));
}

#[test]
#[ignore = "needs a serif font installed on the host"]
fn unwritable_output_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.csv");
    fs::write(
        &input,
        "PreyGene,WT_UB_WT_BR_SaintScore,WT_UB_WT_BR_MG_SaintScore,WT_KO_BR_SaintScore,\
WT_KO_BR_MG_SaintScore,SE_UB_WT_BR_SaintScore,SE_UB_WT_BR_MG_SaintScore,\
SE_KO_BR_SaintScore,SE_KO_BR_MG_SaintScore\nVCP,0.1,0.2,0.3,0.4,0.9,0.9,0.7,0.8\n",
    )
    .unwrap();
    let config = HeatmapConfig {
        input,
        output: tmp.path().join("missing-dir").join("out.png"),
        ..HeatmapConfig::default()
    };
    let err = run(&config).unwrap_err();
    assert!(format!("{err:#}").contains("cannot write image"));
}
