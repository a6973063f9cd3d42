use std::error;
use std::fs::File;
use std::io::BufWriter;

use camino::Utf8Path;
use log::{info, warn};
use simple_error::SimpleError;
use sv_evidence::{
    BedpeEvidenceReader, ChromBreakpointIndex, ChromOrder, EvidenceReader, PairEvidenceReader,
    SampleIdGenerator, SharedEvidenceConfig, process_readers_by_chromosome,
};
use thousands::Separable;
use unwrap::unwrap;

use crate::cli;
use crate::run_stats::{
    BedpeSourceStats, ChromosomeStats, IngestRunStats, PairSourceStats, write_ingest_run_stats,
};

/// Prefix of the diagnostic evidence file written for each BEDPE source
pub const BEDPE_EVIDENCE_FILENAME_PREFIX: &str = "bedpe_evidence";

fn get_bedpe_evidence_output(output_dir: &Utf8Path, id: i32) -> BufWriter<File> {
    let filename = output_dir.join(format!("{BEDPE_EVIDENCE_FILENAME_PREFIX}.{id}.txt"));
    info!("Writing BEDPE evidence to file: '{filename}'");
    let f = unwrap!(
        File::create(&filename),
        "Unable to create BEDPE evidence file: '{filename}'"
    );
    BufWriter::new(f)
}

/// Run every reader together one chromosome at a time, releasing each chromosome's breakpoints once
/// all readers have moved past it
///
fn merge_by_chromosome(
    readers: &mut [&mut dyn EvidenceReader],
    chrom_order: &ChromOrder,
    config: &SharedEvidenceConfig,
    index: &mut ChromBreakpointIndex,
    run_stats: &mut IngestRunStats,
) -> Result<usize, Box<dyn error::Error>> {
    let total = process_readers_by_chromosome(
        readers,
        chrom_order,
        config,
        index,
        |chrom, count, index| {
            let released = index.drain_chrom(chrom);
            info!(
                "Completed chromosome {chrom}: {} breakpoints inserted, {} released",
                count.separate_with_commas(),
                released.separate_with_commas()
            );
            run_stats.chromosomes.push(ChromosomeStats {
                chrom: chrom.to_string(),
                breakpoint_count: count,
            });
        },
    )?;
    Ok(total)
}

fn drain_each(
    readers: &mut [&mut dyn EvidenceReader],
    config: &SharedEvidenceConfig,
    index: &mut ChromBreakpointIndex,
) -> Result<usize, Box<dyn error::Error>> {
    let mut total = 0;
    for reader in readers.iter_mut() {
        let count = reader.drain(config, &mut *index)?;
        info!(
            "Completed evidence source for sample {}: {} breakpoints inserted",
            reader.sample_id(),
            count.separate_with_commas()
        );
        total += count;
    }
    Ok(total)
}

/// Read all evidence sources into breakpoint intervals and write run statistics
///
pub fn run_ingest(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    cli::write_settings(&settings.output_dir, settings);

    let sample_ids = SampleIdGenerator::new();

    let mut pe_readers = settings
        .pe_params
        .iter()
        .map(|x| {
            PairEvidenceReader::new(x.clone(), &sample_ids).with_trace(settings.shared.trace_readers)
        })
        .collect::<Vec<_>>();

    let config = pe_readers
        .first()
        .ok_or_else(|| SimpleError::new("No paired-end evidence source given"))?
        .commit_to_shared_state()?;

    for reader in pe_readers.iter_mut() {
        reader.initialize()?;
    }

    // All sources are merged in the chromosome order of the first alignment header
    let chrom_order = ChromOrder::new(pe_readers[0].reference_names());

    let mut bedpe_readers = settings
        .bedpe_params
        .iter()
        .map(|x| {
            let reader = BedpeEvidenceReader::new(x.clone(), &sample_ids)
                .with_skip_malformed(settings.skip_malformed)
                .with_chrom_order(chrom_order.clone());
            if settings.print_evidence {
                let out = get_bedpe_evidence_output(&settings.output_dir, x.id.unwrap_or_default());
                reader.with_evidence_output(Box::new(out))
            } else {
                reader
            }
        })
        .collect::<Vec<_>>();

    for reader in bedpe_readers.iter_mut() {
        reader.initialize()?;
    }

    let mut run_stats = IngestRunStats::default();
    let mut index = ChromBreakpointIndex::new();
    {
        let mut readers = pe_readers
            .iter_mut()
            .map(|x| x as &mut dyn EvidenceReader)
            .chain(bedpe_readers.iter_mut().map(|x| x as &mut dyn EvidenceReader))
            .collect::<Vec<_>>();

        let total = if settings.whole_file {
            drain_each(&mut readers, &config, &mut index)?
        } else {
            merge_by_chromosome(&mut readers, &chrom_order, &config, &mut index, &mut run_stats)?
        };
        run_stats.total_breakpoint_count = total;
    }

    info!(
        "Total breakpoints inserted: {}",
        run_stats.total_breakpoint_count.separate_with_commas()
    );
    if !index.is_empty() {
        info!(
            "Breakpoints retained in index at end of input: {}",
            index.len().separate_with_commas()
        );
    }

    for (params, reader) in settings.pe_params.iter().zip(pe_readers.iter_mut()) {
        if reader.unpaired_read_count() > 0 {
            warn!(
                "Sample {} has {} reads without a mate in '{}'",
                reader.sample_id(),
                reader.unpaired_read_count().separate_with_commas(),
                params.bam_file.as_deref().unwrap_or_default()
            );
        }
        run_stats.pair_sources.push(PairSourceStats {
            id: params.id.unwrap_or_default(),
            sample_id: reader.sample_id(),
            bam_file: params.bam_file.clone().unwrap_or_default(),
            forwarded_record_count: reader.forwarded_record_count(),
            unpaired_read_count: reader.unpaired_read_count(),
            pair_stats: reader.pair_stats().cloned().unwrap_or_default(),
        });
        reader.terminate()?;
    }

    for (params, reader) in settings.bedpe_params.iter().zip(bedpe_readers.iter_mut()) {
        run_stats.bedpe_sources.push(BedpeSourceStats {
            id: params.id.unwrap_or_default(),
            sample_id: reader.sample_id(),
            bedpe_file: params.bedpe_file.clone().unwrap_or_default(),
            record_count: reader.record_count(),
            malformed_record_count: reader.malformed_record_count(),
        });
        reader.terminate()?;
    }

    write_ingest_run_stats(&settings.output_dir, &run_stats);
    Ok(())
}
