use anyhow::Result;
use saphyr_composer::{
    CommentKind, CommentLine, Composer, Error, Event, EventKind, EventQueue, Location,
    MarkedEvent, NodeKind, Tag,
};

fn at(line: usize, column: usize, index: usize) -> Location {
    Location::new(line, column, index)
}

fn marked(event: Event, line: usize) -> MarkedEvent {
    MarkedEvent::new(event, at(line, 1, 0), at(line, 2, 0))
}

fn block(text: &str) -> Event {
    Event::Comment(CommentLine::new(CommentKind::Block, text))
}

fn two_documents() -> EventQueue {
    EventQueue::new([
        marked(Event::StreamStart, 1),
        marked(Event::DocumentStart { explicit: true }, 1),
        marked(Event::plain("first"), 2),
        marked(Event::DocumentEnd { explicit: false }, 3),
        marked(Event::DocumentStart { explicit: true }, 3),
        marked(Event::plain("second"), 4),
        marked(Event::DocumentEnd { explicit: false }, 5),
        marked(Event::StreamEnd, 5),
    ])
}

#[test]
fn iterates_documents_in_order() -> Result<()> {
    let mut composer = Composer::new(two_documents());
    let mut values = Vec::new();
    while composer.has_more_documents()? {
        let doc = composer.next_document()?;
        values.push(doc.root_node().as_str().unwrap_or_default().to_owned());
    }
    assert_eq!(values, vec!["first", "second"]);
    assert!(!composer.has_more_documents()?);
    Ok(())
}

#[test]
fn iterator_yields_every_document() -> Result<()> {
    let docs = Composer::new(two_documents()).collect::<Result<Vec<_>, _>>()?;
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].start(), at(3, 1, 0));
    Ok(())
}

#[test]
fn single_document_rejects_a_second_document() {
    let err = Composer::new(two_documents())
        .single_document()
        .unwrap_err();
    assert!(matches!(err, Error::Structural { .. }), "{err}");
    assert_eq!(err.location(), Some(at(3, 1, 0)));
    assert_eq!(err.context_location(), Some(at(1, 1, 0)));
    assert_eq!(
        err.to_string(),
        "expected a single document in the stream, but found another document \
         (the first document at line 1, column 1) at line 3, column 1"
    );
}

#[test]
fn single_document_of_an_empty_stream_is_none() -> Result<()> {
    let mut composer = Composer::new(EventQueue::from_events([Event::StreamStart, Event::StreamEnd]));
    assert!(composer.single_document()?.is_none());
    Ok(())
}

#[test]
fn single_document_keeps_trailing_comments() -> Result<()> {
    let events = EventQueue::from_events([
        Event::StreamStart,
        Event::DocumentStart { explicit: false },
        Event::plain("v"),
        Event::DocumentEnd { explicit: false },
        block("after the document"),
        Event::StreamEnd,
    ]);
    let doc = Composer::new(events).single_document()?.expect("document");
    let ends: Vec<_> = doc
        .root_node()
        .end_comments()
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(ends, vec!["after the document"]);
    Ok(())
}

#[test]
fn trailing_comments_become_a_comment_holder() -> Result<()> {
    let events = EventQueue::new([
        marked(Event::StreamStart, 1),
        marked(Event::DocumentStart { explicit: false }, 1),
        marked(Event::plain("v"), 1),
        marked(Event::DocumentEnd { explicit: false }, 1),
        MarkedEvent::new(block("one"), at(2, 1, 2), at(2, 6, 7)),
        MarkedEvent::new(
            Event::Comment(CommentLine::new(CommentKind::BlankLine, "")),
            at(3, 1, 8),
            at(3, 1, 8),
        ),
        marked(Event::StreamEnd, 4),
    ]);
    let mut composer = Composer::new(events);

    assert!(composer.has_more_documents()?);
    assert!(!composer.next_document()?.is_comment_holder());

    assert!(composer.has_more_documents()?);
    let holder = composer.next_document()?;
    assert!(holder.is_comment_holder());
    let root = holder.root_node();
    assert_eq!(root.kind(), NodeKind::Mapping);
    assert_eq!(root.tag(), &Tag::COMMENT);
    assert!(root.is_empty());
    assert_eq!(root.block_comments().len(), 2);
    assert_eq!(root.start(), at(2, 1, 2));
    assert_eq!(root.end(), at(3, 1, 8));

    assert!(!composer.has_more_documents()?);
    Ok(())
}

#[test]
fn next_document_at_stream_end_is_unexpected() {
    let mut composer = Composer::new(EventQueue::from_events([Event::StreamStart, Event::StreamEnd]));
    let err = composer.next_document().unwrap_err();
    assert!(matches!(
        err,
        Error::Unexpected {
            found: EventKind::StreamEnd,
            ..
        }
    ));
}

#[test]
fn exhausted_source_has_no_more_documents() -> Result<()> {
    let mut composer = Composer::new(EventQueue::from_events([Event::StreamStart]));
    assert!(!composer.has_more_documents()?);
    assert!(composer.next().is_none());
    Ok(())
}

#[test]
fn anchors_do_not_leak_into_the_next_document() -> Result<()> {
    let events = EventQueue::from_events([
        Event::StreamStart,
        Event::DocumentStart { explicit: true },
        Event::mapping_start(Some("a")),
        Event::MappingEnd,
        Event::DocumentEnd { explicit: false },
        Event::DocumentStart { explicit: true },
        Event::alias("a"),
        Event::DocumentEnd { explicit: false },
        Event::StreamEnd,
    ]);
    let mut composer = Composer::new(events);
    assert!(composer.has_more_documents()?);
    composer.next_document()?;
    assert!(composer.has_more_documents()?);
    let err = composer.next_document().unwrap_err();
    assert!(matches!(err, Error::UndefinedAlias { .. }), "{err}");
    Ok(())
}

#[test]
fn iteration_stops_after_an_error() {
    let events = EventQueue::from_events([
        Event::StreamStart,
        Event::DocumentStart { explicit: true },
        Event::alias("missing"),
        Event::DocumentEnd { explicit: false },
        Event::DocumentStart { explicit: true },
        Event::plain("never composed"),
        Event::DocumentEnd { explicit: false },
        Event::StreamEnd,
    ]);
    let results: Vec<_> = Composer::new(events).collect();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_err());
}

#[test]
fn failed_document_does_not_poison_a_manual_retry() -> Result<()> {
    let events = EventQueue::from_events([
        Event::StreamStart,
        Event::DocumentStart { explicit: true },
        Event::sequence_start(Some("s")),
        Event::alias("missing"),
        Event::DocumentStart { explicit: true },
        Event::sequence_start(None),
        Event::alias("s"),
        Event::SequenceEnd,
        Event::DocumentEnd { explicit: false },
        Event::StreamEnd,
    ]);
    let mut composer = Composer::new(events);
    assert!(composer.next_document().is_err());
    assert_eq!(composer.report().depth, 0);

    // The caller resynchronizes at the next document; `s` belongs to the failed one.
    let err = composer.next_document().unwrap_err();
    match err {
        Error::UndefinedAlias { anchor, .. } => assert_eq!(anchor, "s"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
