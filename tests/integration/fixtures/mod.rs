// TimeML fixtures shaped like HeidelTime-standalone output
// WHY: reconciliation tests need deterministic markup/offset pairs

/// Document used in the HeidelTime README
pub const MOUNTAINS_TEXT: &str = "Yesterday we drove to the mountains. Today we are going to the sea";

/// HeidelTime TIMEML output for MOUNTAINS_TEXT
pub const MOUNTAINS_TIMEML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE TimeML SYSTEM "TimeML.dtd">
<TimeML>
<TIMEX3 tid="t1" type="DATE" value="XXXX-XX-XX">Yesterday</TIMEX3> we drove to the mountains. <TIMEX3 tid="t2" type="DATE" value="PRESENT_REF">Today</TIMEX3> we are going to the sea
</TimeML>
"#;

/// Repeated phrase: both annotations carry the same text
pub const REPEATED_TIMEML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE TimeML SYSTEM "TimeML.dtd">
<TimeML>
<TIMEX3 tid="t1" type="DATE" value="XXXX-WXX-1">Monday</TIMEX3> we met <TIMEX3 tid="t2" type="DATE" value="XXXX-WXX-1">Monday</TIMEX3>'s client
</TimeML>
"#;

/// German document with multi-byte characters before and inside annotations
pub const GERMAN_TIMEML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE TimeML SYSTEM "TimeML.dtd">
<TimeML>
Über Nacht, am <TIMEX3 tid="t1" type="DATE" value="XXXX-WXX-1">Montag</TIMEX3> für <TIMEX3 tid="t2" type="DURATION" value="P2D">2 Tage</TIMEX3> ins Büro, dann <TIMEX3 tid="t3" type="DATE" value="XXXX-03">März</TIMEX3>.
</TimeML>
"#;

/// Multi-line document without any temporal expression
pub const EMPTY_TIMEML: &str = r#"<?xml version="1.0"?>
<!DOCTYPE TimeML SYSTEM "TimeML.dtd">
<TimeML>
Nothing happened.
Nobody came.
</TimeML>
"#;

/// XMI output, which has no TimeML container
pub const XMI_OUTPUT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:cas="http:///uima/cas.ecore" xmi:version="2.0">
<cas:Sofa xmi:id="1" sofaNum="1" sofaID="_InitialView" mimeType="text" sofaString="Today"/>
</xmi:XMI>
"#;
