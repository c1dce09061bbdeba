//! Runs the configuration, event file and output stages end to end

use particle_hists::{events, output, ParticleHists, RunConfiguration};

use std::{fs, time::Duration};

#[test]
fn fill_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("hists.cfg");
    let events_path = dir.path().join("events.txt");
    let output_path = dir.path().join("hists.data");

    fs::write(
        &config_path,
        "jets/\njet_\njet\nkinematic NLeading2 TLA TLA_leadPts=200 TLA_subleadPts=150 \
         TLA_mjjs=300 TLA_yStars=1 TLA_yStarAntis=1\n",
    )
    .unwrap();
    fs::write(
        &events_path,
        "# event weight pt eta phi e\n\
         7 1.0 220000 -0.3 3.0 240000\n\
         7 1.0 250000 0.3 0.0 270000\n\
         8 0.5 100000 0.0 1.0 100000\n\
         9 1.0\n",
    )
    .unwrap();

    let cfg = RunConfiguration::load(&config_path).unwrap();
    let events = events::load_events(&events_path).unwrap();
    assert_eq!(events.len(), 3);

    let mut hists = ParticleHists::new(&cfg.name, &cfg.detail_str, &cfg.prefix, &cfg.title)
        .unwrap();
    hists.initialize().unwrap();
    for event in &events {
        hists
            .fill_collection(&event.particles, event.weight, Some(&event.info))
            .unwrap();
    }

    let store = hists.histograms();
    assert_eq!(store.find("jet_Pt").unwrap().entries(), 3);
    assert_eq!(store.find("jet_Pt").unwrap().sum_of_weights(), 2.5);
    assert_eq!(store.find("jet_Pt_1").unwrap().entries(), 1);
    let lead_pt = store.find("jet_Pt_l_0").unwrap();
    assert_eq!(lead_pt.entries(), 2);
    assert_eq!(lead_pt.sum_of_weights(), 1.5);

    // Only event 7 has a dijet, with |y*| ~ 0.29 and mjj ~ 510 GeV
    assert_eq!(store.find("TLA_noExtraSel/mjj").unwrap().entries(), 1);
    let region = "TLA_pTlead200_pTsublead150_mjj300_yStar1";
    assert_eq!(store.find(&format!("{}/mjj", region)).unwrap().entries(), 1);
    let anti_region = "TLA_pTlead200_pTsublead150_mjj300_yStarAnti1";
    assert_eq!(store.find(&format!("{}/mjj", anti_region)).unwrap().entries(), 0);

    output::dump_histograms(store, &output_path, events.len(), Duration::from_millis(3))
        .unwrap();
    let text = fs::read_to_string(&output_path).unwrap();
    assert!(text.contains("jets/jet_Pt_l_0"));
    assert!(text.contains(&format!("jets/{}/pTsublead", region)));
    assert_eq!(text.matches("Histogram").count(), store.len());
}

#[test]
fn missing_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = RunConfiguration::load(dir.path().join("nope.cfg")).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.cfg"));
    assert!(events::load_events(dir.path().join("nope.txt")).is_err());
}
